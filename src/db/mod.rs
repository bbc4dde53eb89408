//! Local key/value store backed by SQLite.
//!
//! Two keys matter: `expenses` (JSON array) and `budget` (integer as text).
//! Reads never fail on bad data; they fall back to defaults and log.

mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

use crate::models::Expense;
use crate::state::AppState;

pub(crate) const EXPENSES_KEY: &str = "expenses";
pub(crate) const BUDGET_KEY: &str = "budget";
/// Unreadable expense JSON is copied here before it gets overwritten.
pub(crate) const EXPENSES_QUARANTINE_KEY: &str = "expenses.corrupt";

pub(crate) struct Database {
    conn: Connection,
    default_budget: i64,
}

impl Database {
    pub(crate) fn open(path: &Path, default_budget: i64) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self {
            conn,
            default_budget,
        };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self {
            conn,
            default_budget: crate::models::DEFAULT_BUDGET,
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // v1 is the only layout so far; a newer file came from a newer build
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?;
        if current > schema::CURRENT_VERSION {
            anyhow::bail!(
                "database schema v{current} is newer than supported v{}",
                schema::CURRENT_VERSION
            );
        }
        Ok(())
    }

    // ── Raw keys ──────────────────────────────────────────────

    pub(crate) fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub(crate) fn set_value(&self, key: &str, value: &str) -> Result<()> {
        set_value(&self.conn, key, value)
    }

    #[cfg(test)]
    pub(crate) fn remove_value(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    /// Stored expenses, newest first. Missing or malformed data yields an empty list.
    pub(crate) fn load_expenses(&self) -> Vec<Expense> {
        let raw = match self.get_value(EXPENSES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored expenses");
                return Vec::new();
            }
        };
        let decoded = serde_json::from_str::<Vec<Expense>>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|expenses| check_expenses(&expenses).map(|()| expenses));
        match decoded {
            Ok(expenses) => expenses,
            Err(e) => {
                tracing::warn!(error = %e, "stored expenses are malformed, starting empty");
                if let Err(e) = self.set_value(EXPENSES_QUARANTINE_KEY, &raw) {
                    tracing::warn!(error = %e, "could not keep a copy of malformed expenses");
                }
                Vec::new()
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn save_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let json = serde_json::to_string(expenses)?;
        self.set_value(EXPENSES_KEY, &json)
    }

    // ── Budget ────────────────────────────────────────────────

    /// Stored budget, or the configured default when missing or unparseable.
    pub(crate) fn load_budget(&self) -> i64 {
        match self.get_value(BUDGET_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<i64>() {
                Ok(budget) if budget >= 0 => budget,
                Ok(_) => {
                    tracing::warn!(value = %raw, "stored budget is negative, using default");
                    self.default_budget
                }
                Err(_) => {
                    tracing::warn!(value = %raw, "stored budget is not a number, using default");
                    self.default_budget
                }
            },
            Ok(None) => self.default_budget,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored budget");
                self.default_budget
            }
        }
    }

    pub(crate) fn save_budget(&self, budget: i64) -> Result<()> {
        self.set_value(BUDGET_KEY, &budget.to_string())
    }

    // ── Whole state ───────────────────────────────────────────

    pub(crate) fn load_state(&self) -> AppState {
        AppState {
            expenses: self.load_expenses(),
            budget: self.load_budget(),
        }
    }

    /// Write both keys atomically.
    pub(crate) fn persist(&mut self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string(&state.expenses)?;
        let tx = self.conn.transaction()?;
        set_value(&tx, EXPENSES_KEY, &json)?;
        set_value(&tx, BUDGET_KEY, &state.budget.to_string())?;
        tx.commit()?;
        tracing::debug!(
            expenses = state.expenses.len(),
            budget = state.budget,
            "state persisted"
        );
        Ok(())
    }

    // ── Export ────────────────────────────────────────────────

    pub(crate) fn export_to_csv(&self, path: &str, expenses: &[Expense]) -> Result<usize> {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {path}"))?;
        wtr.write_record(["id", "date", "category", "amount", "note"])?;
        for e in expenses {
            let date = e.date.format("%Y-%m-%d").to_string();
            let amount = e.amount.to_string();
            wtr.write_record([
                e.id.as_str(),
                date.as_str(),
                e.category.label(),
                amount.as_str(),
                e.note.as_str(),
            ])?;
        }
        wtr.flush()?;
        Ok(expenses.len())
    }
}

/// Decoded records must have positive amounts and unique ids.
fn check_expenses(expenses: &[Expense]) -> std::result::Result<(), String> {
    let mut seen = HashSet::new();
    for e in expenses {
        if e.amount <= 0 {
            return Err(format!("expense {} has non-positive amount {}", e.id, e.amount));
        }
        if !seen.insert(&e.id) {
            return Err(format!("duplicate expense id {}", e.id));
        }
    }
    Ok(())
}

fn set_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
        params![key, value, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}
