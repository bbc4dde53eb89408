//! Application state and the pure update functions that change it.
//!
//! Nothing in here touches storage. Callers persist the returned state after
//! every applied action.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ValidationError;
use crate::models::{Category, Expense, ExpenseId, DEFAULT_BUDGET};

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[0-9]+$").expect("amount pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppState {
    /// Newest first.
    pub(crate) expenses: Vec<Expense>,
    pub(crate) budget: i64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            expenses: Vec::new(),
            budget: DEFAULT_BUDGET,
        }
    }
}

impl AppState {
    pub(crate) fn find(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| &e.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    AddExpense(Expense),
    DeleteExpense(ExpenseId),
    ResetAll,
    SetBudget(i64),
}

impl Action {
    /// Prompt to show before running a destructive action, if any.
    pub(crate) fn confirmation_prompt(&self) -> Option<String> {
        match self {
            Self::DeleteExpense(_) => Some("Xóa giao dịch này?".into()),
            Self::ResetAll => Some("Xóa toàn bộ dữ liệu?".into()),
            Self::AddExpense(_) | Self::SetBudget(_) => None,
        }
    }
}

pub(crate) fn reduce(state: &AppState, action: Action) -> Result<AppState, ValidationError> {
    match action {
        Action::AddExpense(expense) => {
            let mut expenses = Vec::with_capacity(state.expenses.len() + 1);
            expenses.push(expense);
            expenses.extend(state.expenses.iter().cloned());
            Ok(AppState {
                expenses,
                budget: state.budget,
            })
        }
        Action::DeleteExpense(id) => {
            if state.find(&id).is_none() {
                return Err(ValidationError::UnknownExpense(id.to_string()));
            }
            Ok(AppState {
                expenses: state
                    .expenses
                    .iter()
                    .filter(|e| e.id != id)
                    .cloned()
                    .collect(),
                budget: state.budget,
            })
        }
        Action::ResetAll => Ok(AppState {
            expenses: Vec::new(),
            budget: state.budget,
        }),
        Action::SetBudget(limit) => {
            if limit < 0 {
                return Err(ValidationError::NegativeBudget(limit));
            }
            Ok(AppState {
                expenses: state.expenses.clone(),
                budget: limit,
            })
        }
    }
}

/// Asks the user to approve a destructive action.
pub(crate) trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// An answer the user already gave: a TUI keypress, or `--yes` on the CLI.
pub(crate) struct Answered(pub(crate) bool);

impl Confirm for Answered {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Applied(AppState),
    Declined,
}

/// Confirm-then-execute. Only actions with a confirmation prompt consult `confirm`.
pub(crate) fn dispatch(
    state: &AppState,
    action: Action,
    confirm: &mut dyn Confirm,
) -> Result<Dispatch, ValidationError> {
    if let Action::DeleteExpense(id) = &action {
        if state.find(id).is_none() {
            return Err(ValidationError::UnknownExpense(id.to_string()));
        }
    }
    if let Some(prompt) = action.confirmation_prompt() {
        if !confirm.confirm(&prompt) {
            return Ok(Dispatch::Declined);
        }
    }
    reduce(state, action).map(Dispatch::Applied)
}

/// Raw add-expense input as typed by the user.
#[derive(Debug, Clone)]
pub(crate) struct ExpenseDraft {
    pub(crate) amount: String,
    pub(crate) category: Category,
    pub(crate) date: String,
    pub(crate) note: String,
}

impl ExpenseDraft {
    pub(crate) fn new(today: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            category: Category::Food,
            date: today.format("%Y-%m-%d").to_string(),
            note: String::new(),
        }
    }

    /// Check the input and build a record with a fresh id derived from `now_millis`.
    pub(crate) fn validate(
        &self,
        existing: &[Expense],
        now_millis: i64,
    ) -> Result<Expense, ValidationError> {
        let amount = parse_amount(&self.amount)?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;
        Ok(Expense {
            id: ExpenseId::generate(now_millis, existing),
            amount,
            category: self.category,
            date,
            note: Expense::normalize_note(&self.note),
        })
    }
}

/// Digits only, must fit in an `i64` and be greater than zero.
pub(crate) fn parse_amount(raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if !AMOUNT_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidAmount(raw.to_string()));
    }
    match trimmed.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ValidationError::InvalidAmount(raw.to_string())),
    }
}

/// Budget input: whole number, zero allowed.
pub(crate) fn parse_budget(raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(raw.to_string()))?;
    if value < 0 {
        return Err(ValidationError::NegativeBudget(value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests;
