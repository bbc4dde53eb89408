#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use super::app::*;
use crate::advice::{AdviceService, START_PROMPT};
use crate::db::Database;
use crate::error::AdviceError;
use crate::models::{Category, Expense, ExpenseId};
use crate::state::{Action, AppState};

struct EchoService {
    prompts: Mutex<Vec<String>>,
}

impl AdviceService for EchoService {
    fn generate(&self, prompt: &str) -> Result<String, AdviceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Tiết kiệm hơn nhé".into())
    }
}

fn echo() -> Arc<EchoService> {
    Arc::new(EchoService {
        prompts: Mutex::new(Vec::new()),
    })
}

fn make_expense(id: &str, amount: i64, category: Category) -> Expense {
    Expense {
        id: ExpenseId::new(id),
        amount,
        category,
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        note: "x".into(),
    }
}

fn seeded_app() -> App {
    let state = AppState {
        expenses: vec![
            make_expense("2", 30000, Category::Transport),
            make_expense("1", 50000, Category::Food),
        ],
        budget: 100000,
    };
    App::new(state, echo())
}

/// Poll until the worker answers. The fake service replies immediately.
fn wait_for_advice(app: &mut App) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while app.advice.is_analyzing() && Instant::now() < deadline {
        app.poll_advice();
        std::thread::sleep(Duration::from_millis(5));
    }
}

// ── Derived values ────────────────────────────────────────────

#[test]
fn test_new_computes_derived() {
    let app = seeded_app();
    assert_eq!(app.total, 80000);
    assert_eq!(app.utilization, 80);
    assert_eq!(app.breakdown.len(), 2);
    assert_eq!(app.breakdown[0].category, Category::Food);
    assert_eq!(app.screen, Screen::Home);
}

// ── Actions ───────────────────────────────────────────────────

#[test]
fn test_budget_applies_and_persists() {
    let mut db = Database::open_in_memory().unwrap();
    let mut app = seeded_app();
    app.request(Action::SetBudget(160000), &mut db);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.state.budget, 160000);
    assert_eq!(app.utilization, 50);
    assert_eq!(db.load_budget(), 160000);
}

#[test]
fn test_negative_budget_only_reports() {
    let mut db = Database::open_in_memory().unwrap();
    let mut app = seeded_app();
    app.request(Action::SetBudget(-5), &mut db);
    assert_eq!(app.state.budget, 100000);
    assert!(app.status_message.contains("negative"));
}

#[test]
fn test_delete_waits_for_confirmation() {
    let mut db = Database::open_in_memory().unwrap();
    let mut app = seeded_app();
    app.request(Action::DeleteExpense(ExpenseId::new("1")), &mut db);
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert_eq!(app.confirm_message, "Xóa giao dịch này?");
    assert_eq!(app.state.expenses.len(), 2);

    app.resolve_pending(true, &mut db);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.state.expenses.len(), 1);
    assert_eq!(app.total, 30000);
    assert_eq!(db.load_expenses().len(), 1);
}

#[test]
fn test_delete_unknown_id_skips_confirmation() {
    let mut db = Database::open_in_memory().unwrap();
    let mut app = seeded_app();
    app.request(Action::DeleteExpense(ExpenseId::new("404")), &mut db);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.pending_action.is_none());
    assert_eq!(app.status_message, "No expense with id 404");
    assert_eq!(app.state.expenses.len(), 2);
}

#[test]
fn test_declined_reset_keeps_records() {
    let mut db = Database::open_in_memory().unwrap();
    let mut app = seeded_app();
    app.request(Action::ResetAll, &mut db);
    app.resolve_pending(false, &mut db);
    assert_eq!(app.state.expenses.len(), 2);
    assert_eq!(app.status_message, "Cancelled");
    assert!(app.pending_action.is_none());
}

#[test]
fn test_cursor_clamped_after_delete() {
    let mut db = Database::open_in_memory().unwrap();
    let mut app = seeded_app();
    app.expense_index = 1;
    app.request(Action::DeleteExpense(ExpenseId::new("1")), &mut db);
    app.resolve_pending(true, &mut db);
    assert_eq!(app.expense_index, 0);
}

// ── Form ──────────────────────────────────────────────────────

#[test]
fn test_form_rejects_bad_amount() {
    let mut db = Database::open_in_memory().unwrap();
    let mut app = seeded_app();
    app.open_form();
    app.form.amount = "12.5".into();
    app.submit_form(&mut db);
    assert_eq!(app.input_mode, InputMode::Form);
    assert_eq!(app.state.expenses.len(), 2);
    assert!(app.status_message.starts_with("Invalid amount"));
}

#[test]
fn test_form_submit_prepends() {
    let mut db = Database::open_in_memory().unwrap();
    let mut app = seeded_app();
    app.open_form();
    if let Some(buf) = app.form_buffer() {
        buf.push_str("20000");
    }
    app.form_field = FormField::Category;
    assert!(app.form_buffer().is_none());
    app.cycle_form_category(1);
    app.submit_form(&mut db);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.state.expenses.len(), 3);
    assert_eq!(app.state.expenses[0].amount, 20000);
    assert_eq!(app.state.expenses[0].category, Category::Transport);
    assert_eq!(app.total, 100000);
    assert_eq!(db.load_expenses(), app.state.expenses);
}

#[test]
fn test_form_field_cycle() {
    assert_eq!(FormField::Note.next(), FormField::Amount);
    assert_eq!(FormField::Amount.prev(), FormField::Note);
    for field in FormField::all() {
        assert_eq!(field.next().prev(), *field);
    }
}

// ── Advice ────────────────────────────────────────────────────

#[test]
fn test_advice_roundtrip() {
    let mut app = seeded_app();
    app.start_advice();
    assert!(app.advice.is_analyzing());
    wait_for_advice(&mut app);
    assert!(!app.advice.is_analyzing());
    assert_eq!(app.advice_text.as_deref(), Some("Tiết kiệm hơn nhé"));
}

#[test]
fn test_second_advice_request_ignored() {
    let service = echo();
    let mut app = App::new(
        AppState {
            expenses: vec![make_expense("1", 1000, Category::Food)],
            budget: 0,
        },
        service.clone(),
    );
    app.start_advice();
    app.start_advice();
    assert_eq!(app.status_message, "an advice request is already in flight");
    wait_for_advice(&mut app);
    assert_eq!(service.prompts.lock().unwrap().len(), 1);
}

#[test]
fn test_advice_uses_snapshot() {
    let mut db = Database::open_in_memory().unwrap();
    let service = echo();
    let mut app = App::new(
        AppState {
            expenses: vec![make_expense("1", 50000, Category::Food)],
            budget: 100000,
        },
        service.clone(),
    );
    app.start_advice();
    app.request(Action::ResetAll, &mut db);
    app.resolve_pending(true, &mut db);
    wait_for_advice(&mut app);
    assert!(app.state.expenses.is_empty());
    let prompts = service.prompts.lock().unwrap();
    assert!(prompts[0].contains("50.000 VND"));
}

#[test]
fn test_advice_on_empty_list() {
    let mut app = App::new(AppState::default(), echo());
    app.start_advice();
    wait_for_advice(&mut app);
    assert_eq!(app.advice_text.as_deref(), Some(START_PROMPT));
}
