#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;

use super::*;
use crate::models::NOTE_PLACEHOLDER;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
}

fn make_expense(id: &str, amount: i64) -> Expense {
    Expense {
        id: ExpenseId::new(id),
        amount,
        category: Category::Food,
        date: today(),
        note: "x".into(),
    }
}

fn seeded() -> AppState {
    AppState {
        expenses: vec![make_expense("3", 300), make_expense("2", 200), make_expense("1", 100)],
        budget: 100000,
    }
}

struct Scripted {
    answer: bool,
    prompts: Vec<String>,
}

impl Confirm for Scripted {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answer
    }
}

// ── reduce ────────────────────────────────────────────────────

#[test]
fn test_default_state() {
    let state = AppState::default();
    assert!(state.expenses.is_empty());
    assert_eq!(state.budget, DEFAULT_BUDGET);
}

#[test]
fn test_add_prepends() {
    let state = seeded();
    let next = reduce(&state, Action::AddExpense(make_expense("4", 400))).unwrap();
    let ids: Vec<&str> = next.expenses.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["4", "3", "2", "1"]);
    // input untouched
    assert_eq!(state.expenses.len(), 3);
}

#[test]
fn test_delete_by_id() {
    let next = reduce(&seeded(), Action::DeleteExpense(ExpenseId::new("2"))).unwrap();
    let ids: Vec<&str> = next.expenses.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["3", "1"]);
}

#[test]
fn test_delete_unknown_id() {
    let err = reduce(&seeded(), Action::DeleteExpense(ExpenseId::new("99"))).unwrap_err();
    assert_eq!(err, ValidationError::UnknownExpense("99".into()));
}

#[test]
fn test_add_then_delete_restores() {
    let state = seeded();
    let added = reduce(&state, Action::AddExpense(make_expense("4", 400))).unwrap();
    let removed = reduce(&added, Action::DeleteExpense(ExpenseId::new("4"))).unwrap();
    assert_eq!(removed, state);
}

#[test]
fn test_reset_keeps_budget() {
    let next = reduce(&seeded(), Action::ResetAll).unwrap();
    assert!(next.expenses.is_empty());
    assert_eq!(next.budget, 100000);
}

#[test]
fn test_set_budget() {
    let next = reduce(&seeded(), Action::SetBudget(250000)).unwrap();
    assert_eq!(next.budget, 250000);
    assert_eq!(next.expenses.len(), 3);

    let zero = reduce(&seeded(), Action::SetBudget(0)).unwrap();
    assert_eq!(zero.budget, 0);
}

#[test]
fn test_set_budget_negative() {
    let err = reduce(&seeded(), Action::SetBudget(-1)).unwrap_err();
    assert_eq!(err, ValidationError::NegativeBudget(-1));
}

// ── dispatch ──────────────────────────────────────────────────

#[test]
fn test_dispatch_declined_leaves_state() {
    let mut confirm = Scripted {
        answer: false,
        prompts: Vec::new(),
    };
    let result = dispatch(&seeded(), Action::ResetAll, &mut confirm).unwrap();
    assert_eq!(result, Dispatch::Declined);
    assert_eq!(confirm.prompts, ["Xóa toàn bộ dữ liệu?"]);
}

#[test]
fn test_dispatch_confirmed_delete() {
    let mut confirm = Scripted {
        answer: true,
        prompts: Vec::new(),
    };
    let result = dispatch(
        &seeded(),
        Action::DeleteExpense(ExpenseId::new("1")),
        &mut confirm,
    )
    .unwrap();
    match result {
        Dispatch::Applied(state) => assert_eq!(state.expenses.len(), 2),
        Dispatch::Declined => panic!("expected the delete to apply"),
    }
    assert_eq!(confirm.prompts, ["Xóa giao dịch này?"]);
}

#[test]
fn test_dispatch_unknown_id_does_not_prompt() {
    let mut confirm = Scripted {
        answer: true,
        prompts: Vec::new(),
    };
    let err = dispatch(
        &seeded(),
        Action::DeleteExpense(ExpenseId::new("nope")),
        &mut confirm,
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::UnknownExpense("nope".into()));
    assert!(confirm.prompts.is_empty());
}

#[test]
fn test_dispatch_add_skips_confirmation() {
    let mut confirm = Scripted {
        answer: false,
        prompts: Vec::new(),
    };
    let result = dispatch(&seeded(), Action::SetBudget(1), &mut confirm).unwrap();
    assert!(matches!(result, Dispatch::Applied(s) if s.budget == 1));
    assert!(confirm.prompts.is_empty());
}

#[test]
fn test_answered() {
    let result = dispatch(&seeded(), Action::ResetAll, &mut Answered(true)).unwrap();
    assert!(matches!(result, Dispatch::Applied(s) if s.expenses.is_empty()));
    let result = dispatch(&seeded(), Action::ResetAll, &mut Answered(false)).unwrap();
    assert_eq!(result, Dispatch::Declined);
}

// ── ExpenseDraft ──────────────────────────────────────────────

fn draft(amount: &str, date: &str, note: &str) -> ExpenseDraft {
    ExpenseDraft {
        amount: amount.into(),
        category: Category::Transport,
        date: date.into(),
        note: note.into(),
    }
}

#[test]
fn test_draft_defaults() {
    let d = ExpenseDraft::new(today());
    assert!(d.amount.is_empty());
    assert_eq!(d.category, Category::Food);
    assert_eq!(d.date, "2024-05-20");
}

#[test]
fn test_draft_validate_ok() {
    let expense = draft("30000", "2024-05-19", " Grab ")
        .validate(&[], 1_716_000_000_000)
        .unwrap();
    assert_eq!(expense.id.as_str(), "1716000000000");
    assert_eq!(expense.amount, 30000);
    assert_eq!(expense.category, Category::Transport);
    assert_eq!(expense.date, NaiveDate::from_ymd_opt(2024, 5, 19).unwrap());
    assert_eq!(expense.note, "Grab");
}

#[test]
fn test_draft_blank_note_placeholder() {
    let expense = draft("1", "2024-05-19", "").validate(&[], 1).unwrap();
    assert_eq!(expense.note, NOTE_PLACEHOLDER);
}

#[test]
fn test_draft_rejects_bad_amounts() {
    for bad in ["", "0", "000", "-5", "12.5", "1e3", "abc", "99999999999999999999"] {
        let err = draft(bad, "2024-05-19", "").validate(&[], 1).unwrap_err();
        assert_eq!(err, ValidationError::InvalidAmount(bad.into()), "{bad}");
    }
}

#[test]
fn test_draft_rejects_bad_date() {
    let err = draft("100", "19/05/2024", "").validate(&[], 1).unwrap_err();
    assert_eq!(err, ValidationError::InvalidDate("19/05/2024".into()));
    let err = draft("100", "2024-02-30", "").validate(&[], 1).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidDate(_)));
}

#[test]
fn test_draft_unique_id() {
    let existing = vec![make_expense("42", 1)];
    let expense = draft("5", "2024-05-19", "").validate(&existing, 42).unwrap();
    assert_eq!(expense.id.as_str(), "43");
}

// ── parse_amount / parse_budget ───────────────────────────────

#[test]
fn test_parse_amount_trims() {
    assert_eq!(parse_amount(" 50000 ").unwrap(), 50000);
}

#[test]
fn test_parse_budget() {
    assert_eq!(parse_budget("0").unwrap(), 0);
    assert_eq!(parse_budget("5000000").unwrap(), 5_000_000);
    assert_eq!(parse_budget("-10").unwrap_err(), ValidationError::NegativeBudget(-10));
    assert!(matches!(
        parse_budget("lots").unwrap_err(),
        ValidationError::InvalidAmount(_)
    ));
}
