#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::*;
use crate::models::{Category, ExpenseId};

/// Records prompts and replies with a canned result.
struct FakeService {
    reply: fn() -> Result<String, AdviceError>,
    prompts: Mutex<Vec<String>>,
}

impl FakeService {
    fn new(reply: fn() -> Result<String, AdviceError>) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl AdviceService for FakeService {
    fn generate(&self, prompt: &str) -> Result<String, AdviceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)()
    }
}

fn make_expense(id: &str, amount: i64, category: Category, day: u32, note: &str) -> Expense {
    Expense {
        id: ExpenseId::new(id),
        amount,
        category,
        date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        note: note.into(),
    }
}

fn sample() -> Vec<Expense> {
    vec![
        make_expense("2", 30000, Category::Transport, 2, "Grab"),
        make_expense("1", 50000, Category::Food, 1, "Phở"),
    ]
}

// ── build_summary / build_prompt ──────────────────────────────

#[test]
fn test_summary_lines_in_list_order() {
    assert_eq!(
        build_summary(&sample()),
        "- 2024-06-02: Di chuyển - 30.000 VND (Grab)\n- 2024-06-01: Ăn uống - 50.000 VND (Phở)"
    );
}

#[test]
fn test_summary_empty() {
    assert_eq!(build_summary(&[]), "");
}

#[test]
fn test_prompt_embeds_totals_and_summary() {
    let prompt = build_prompt(&sample(), 100000);
    assert!(prompt.contains("Tổng chi tiêu: 80.000 VND"));
    assert!(prompt.contains("Ngân sách mục tiêu: 100.000 VND"));
    assert!(prompt.contains(&build_summary(&sample())));
    assert!(prompt.contains("1 hạng mục lãng phí nhất"));
    assert!(prompt.contains("3 hành động cụ thể"));
}

// ── request_advice ────────────────────────────────────────────

#[test]
fn test_empty_records_skip_service() {
    let service = FakeService::new(|| Ok("should not be used".into()));
    assert_eq!(request_advice(&[], 100000, &service), START_PROMPT);
    assert_eq!(service.calls(), 0);
}

#[test]
fn test_success_returns_text() {
    let service = FakeService::new(|| Ok("Bạn chi tiêu hợp lý 👍".into()));
    assert_eq!(
        request_advice(&sample(), 100000, &service),
        "Bạn chi tiêu hợp lý 👍"
    );
    assert_eq!(service.calls(), 1);
    let prompts = service.prompts.lock().unwrap();
    assert_eq!(prompts[0], build_prompt(&sample(), 100000));
}

#[test]
fn test_empty_text_falls_back() {
    let service = FakeService::new(|| Ok("   \n".into()));
    assert_eq!(request_advice(&sample(), 100000, &service), EMPTY_RESPONSE);
}

#[test]
fn test_service_error_is_swallowed() {
    let service = FakeService::new(|| Err(AdviceError::MissingApiKey("GEMINI_API_KEY".into())));
    assert_eq!(request_advice(&sample(), 100000, &service), SERVICE_ERROR);
}

#[test]
fn test_decode_error_is_swallowed() {
    let service = FakeService::new(|| {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        Err(AdviceError::Decode(err))
    });
    assert_eq!(request_advice(&sample(), 0, &service), SERVICE_ERROR);
}

// ── spawn_request ─────────────────────────────────────────────

#[test]
fn test_spawn_request_uses_snapshot() {
    let service = Arc::new(FakeService::new(|| Ok("ok".into())));
    let mut expenses = sample();
    let rx = spawn_request(expenses.clone(), 100000, service.clone());
    // Mutating after the request started must not change what was sent.
    expenses.clear();
    assert_eq!(rx.recv().unwrap(), "ok");
    assert!(expenses.is_empty());
    let prompts = service.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Tổng chi tiêu: 80.000 VND"));
}

#[test]
fn test_spawn_request_empty_list() {
    let service = Arc::new(FakeService::new(|| Ok("unused".into())));
    let rx = spawn_request(Vec::new(), 100000, service.clone());
    assert_eq!(rx.recv().unwrap(), START_PROMPT);
    assert_eq!(service.calls(), 0);
}

// ── AdviceSession ─────────────────────────────────────────────

#[test]
fn test_session_starts_idle() {
    assert_eq!(AdviceSession::default(), AdviceSession::Idle);
}

#[test]
fn test_session_rejects_second_request() {
    let mut session = AdviceSession::default();
    session.begin().unwrap();
    assert!(session.is_analyzing());
    assert!(matches!(session.begin(), Err(AdviceError::AlreadyInFlight)));
    assert!(session.is_analyzing());
}

#[test]
fn test_session_finish_returns_to_idle() {
    let mut session = AdviceSession::default();
    session.begin().unwrap();
    session.finish();
    assert_eq!(session, AdviceSession::Idle);
    session.begin().unwrap();
}
