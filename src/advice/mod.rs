//! Spending advice from an external text-generation service.
//!
//! [`request_advice`] never fails: every service error is logged and mapped to
//! a fixed message, so callers only ever see text.

pub(crate) mod gemini;

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use crate::analytics::total_spend;
use crate::error::AdviceError;
use crate::format::format_amount;
use crate::models::Expense;

pub(crate) const START_PROMPT: &str = "Hãy bắt đầu nhập chi tiêu để tôi có thể tư vấn cho bạn!";
pub(crate) const EMPTY_RESPONSE: &str = "Tôi không thể phân tích dữ liệu lúc này.";
pub(crate) const SERVICE_ERROR: &str = "Đã có lỗi xảy ra khi kết nối với trợ lý AI.";

/// One-shot prompt → text. Implementations must not keep conversation state.
pub(crate) trait AdviceService: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, AdviceError>;
}

/// One line per expense, in list order (newest first).
pub(crate) fn build_summary(expenses: &[Expense]) -> String {
    expenses
        .iter()
        .map(|e| {
            format!(
                "- {}: {} - {} VND ({})",
                e.date.format("%Y-%m-%d"),
                e.category,
                format_amount(e.amount),
                e.note
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn build_prompt(expenses: &[Expense], budget: i64) -> String {
    let total = total_spend(expenses);
    format!(
        "Bạn là một chuyên gia quản lý tài chính cá nhân.
Dữ liệu chi tiêu:
- Tổng chi tiêu: {total} VND
- Ngân sách mục tiêu: {budget} VND
- Chi tiết:
{summary}

Nhiệm vụ:
1. Đánh giá tình hình chi tiêu so với ngân sách (ngắn gọn).
2. Chỉ ra 1 hạng mục lãng phí nhất.
3. Đưa ra 3 hành động cụ thể để tiết kiệm trong tuần tới.

Yêu cầu: Trả lời bằng tiếng Việt, thân thiện, súc tích, dùng icon phù hợp.",
        total = format_amount(total),
        budget = format_amount(budget),
        summary = build_summary(expenses),
    )
}

/// Ask `service` for advice on `expenses` against `budget`.
///
/// An empty list short-circuits without contacting the service.
pub(crate) fn request_advice(
    expenses: &[Expense],
    budget: i64,
    service: &dyn AdviceService,
) -> String {
    if expenses.is_empty() {
        return START_PROMPT.to_string();
    }

    let prompt = build_prompt(expenses, budget);
    tracing::info!(
        records = expenses.len(),
        prompt_len = prompt.len(),
        "requesting spending advice"
    );

    match service.generate(&prompt) {
        Ok(text) if text.trim().is_empty() => {
            tracing::warn!("advice service returned no text");
            EMPTY_RESPONSE.to_string()
        }
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "advice request failed");
            SERVICE_ERROR.to_string()
        }
    }
}

/// Run [`request_advice`] on a worker thread over an owned snapshot.
///
/// Later changes to the caller's state do not reach the request. The receiver
/// yields exactly one message, or disconnects if the worker dies.
pub(crate) fn spawn_request(
    expenses: Vec<Expense>,
    budget: i64,
    service: Arc<dyn AdviceService>,
) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let text = request_advice(&expenses, budget, service.as_ref());
        let _ = tx.send(text);
    });
    rx
}

/// Idle → Analyzing → Idle. At most one request is in flight at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum AdviceSession {
    #[default]
    Idle,
    Analyzing,
}

impl AdviceSession {
    pub(crate) fn is_analyzing(&self) -> bool {
        matches!(self, Self::Analyzing)
    }

    pub(crate) fn begin(&mut self) -> Result<(), AdviceError> {
        if self.is_analyzing() {
            return Err(AdviceError::AlreadyInFlight);
        }
        *self = Self::Analyzing;
        Ok(())
    }

    /// Settle the in-flight request. Always returns to `Idle`.
    pub(crate) fn finish(&mut self) {
        *self = Self::Idle;
    }
}

#[cfg(test)]
mod tests;
