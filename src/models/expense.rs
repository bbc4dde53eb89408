use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Category;

/// Note stored when the user leaves the note blank.
pub(crate) const NOTE_PLACEHOLDER: &str = "Không ghi chú";

/// Timestamp-derived identifier (Unix milliseconds as decimal text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct ExpenseId(String);

impl ExpenseId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from `now_millis`, bumping past any id already taken.
    pub(crate) fn generate(now_millis: i64, existing: &[Expense]) -> Self {
        let mut candidate = now_millis;
        while existing.iter().any(|e| e.id.0 == candidate.to_string()) {
            candidate += 1;
        }
        Self(candidate.to_string())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Expense {
    pub(crate) id: ExpenseId,
    pub(crate) amount: i64,
    pub(crate) category: Category,
    pub(crate) date: NaiveDate,
    pub(crate) note: String,
}

impl Expense {
    /// Blank notes fall back to [`NOTE_PLACEHOLDER`].
    pub(crate) fn normalize_note(note: &str) -> String {
        let trimmed = note.trim();
        if trimmed.is_empty() {
            NOTE_PLACEHOLDER.to_string()
        } else {
            trimmed.to_string()
        }
    }
}
