mod category;
mod expense;

pub(crate) use category::Category;
pub(crate) use expense::{Expense, ExpenseId, NOTE_PLACEHOLDER};

/// Budget used when nothing has been stored yet.
pub(crate) const DEFAULT_BUDGET: i64 = 5_000_000;
