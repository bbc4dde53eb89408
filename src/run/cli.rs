use anyhow::Result;
use chrono::{Local, Utc};
use std::io::{self, BufRead, Write};

use crate::advice::{self, AdviceService};
use crate::analytics;
use crate::db::Database;
use crate::error::ValidationError;
use crate::format::format_vnd;
use crate::models::{Category, ExpenseId};
use crate::state::{dispatch, parse_budget, Action, Answered, Confirm, Dispatch, ExpenseDraft};

pub(crate) fn as_cli(
    args: &[String],
    db: &mut Database,
    service: &dyn AdviceService,
) -> Result<()> {
    match args[1].as_str() {
        "add" | "a" => cli_add(&args[2..], db),
        "list" | "ls" => cli_list(db),
        "delete" | "rm" => cli_delete(&args[2..], db),
        "reset" => cli_reset(&args[2..], db),
        "budget" => cli_budget(&args[2..], db),
        "summary" | "s" => cli_summary(db),
        "advise" | "ai" => cli_advise(db, service),
        "export" => cli_export(&args[2..], db),
        "categories" => {
            cli_categories();
            Ok(())
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("FinTrack: local expense tracker with an AI spending assistant");
    println!();
    println!("Usage: fintrack [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  add <amount> <category>       Record an expense");
    println!("    --date <YYYY-MM-DD>         Date of the expense (default: today)");
    println!("    --note <text>               Free-text note");
    println!("  list                          List expenses, newest first");
    println!("  delete <id> [--yes]           Delete one expense");
    println!("  reset [--yes]                 Delete every expense (the budget is kept)");
    println!("  budget [amount]               Show or set the budget limit");
    println!("  summary                       Totals, budget use and category breakdown");
    println!("  advise                        Ask the AI assistant for advice");
    println!("  export [path]                 Export expenses to CSV");
    println!("  categories                    List categories and their short names");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

/// `[y/N]` prompt on stdin. Anything but y/yes declines.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_yes(&line),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "có" | "co")
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments that are neither `--flag`s nor the value following a valued flag.
fn positional<'a>(args: &'a [String], valued_flags: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if valued_flags.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

/// Run `action` through confirmation, then persist. Validation errors end the command.
fn run_action(db: &mut Database, action: Action, confirm: &mut dyn Confirm) -> Result<bool> {
    let state = db.load_state();
    match dispatch(&state, action, confirm)? {
        Dispatch::Applied(next) => {
            db.persist(&next)?;
            Ok(true)
        }
        Dispatch::Declined => {
            println!("Cancelled");
            Ok(false)
        }
    }
}

fn confirmer(args: &[String]) -> Box<dyn Confirm> {
    if has_flag(args, "--yes") {
        Box::new(Answered(true))
    } else {
        Box::new(StdinConfirm)
    }
}

fn cli_add(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positional(args, &["--date", "--note"]);
    let (Some(amount), Some(category_arg)) = (pos.first(), pos.get(1)) else {
        anyhow::bail!("Usage: fintrack add <amount> <category> [--date YYYY-MM-DD] [--note TEXT]");
    };

    let category = Category::parse(category_arg)
        .ok_or_else(|| ValidationError::UnknownCategory(category_arg.to_string()))?;

    let mut draft = ExpenseDraft::new(Local::now().date_naive());
    draft.amount = amount.to_string();
    draft.category = category;
    if let Some(date) = flag_value(args, "--date") {
        draft.date = date.to_string();
    }
    draft.note = flag_value(args, "--note").unwrap_or_default().to_string();

    let state = db.load_state();
    let expense = draft.validate(&state.expenses, Utc::now().timestamp_millis())?;
    let summary = format!(
        "Added {} {} on {} (id {})",
        format_vnd(expense.amount),
        expense.category,
        expense.date,
        expense.id
    );
    run_action(db, Action::AddExpense(expense), &mut Answered(true))?;
    println!("{summary}");
    Ok(())
}

fn cli_list(db: &mut Database) -> Result<()> {
    let expenses = db.load_expenses();
    if expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    println!(
        "{:<15} {:<10} {:<12} {:>14}  Note",
        "ID", "Date", "Category", "Amount"
    );
    println!("{}", "─".repeat(70));
    for e in &expenses {
        println!(
            "{:<15} {:<10} {:<12} {:>14}  {}",
            e.id.as_str(),
            e.date.format("%Y-%m-%d").to_string(),
            e.category.label(),
            format_vnd(e.amount),
            e.note,
        );
    }
    Ok(())
}

fn cli_delete(args: &[String], db: &mut Database) -> Result<()> {
    let Some(id) = positional(args, &[]).first().copied() else {
        anyhow::bail!("Usage: fintrack delete <id> [--yes]");
    };
    if run_action(
        db,
        Action::DeleteExpense(ExpenseId::new(id)),
        confirmer(args).as_mut(),
    )? {
        println!("Deleted expense {id}");
    }
    Ok(())
}

fn cli_reset(args: &[String], db: &mut Database) -> Result<()> {
    if run_action(db, Action::ResetAll, confirmer(args).as_mut())? {
        println!("All expenses cleared");
    }
    Ok(())
}

fn cli_budget(args: &[String], db: &mut Database) -> Result<()> {
    let Some(raw) = args.first() else {
        let budget = db.load_budget();
        if analytics::budget_is_configured(budget) {
            println!("Budget: {}", format_vnd(budget));
        } else {
            println!("Budget: not set");
        }
        return Ok(());
    };

    let limit = parse_budget(raw)?;
    run_action(db, Action::SetBudget(limit), &mut Answered(true))?;
    println!("Budget set to {}", format_vnd(limit));
    Ok(())
}

fn cli_summary(db: &mut Database) -> Result<()> {
    let state = db.load_state();
    let total = analytics::total_spend(&state.expenses);

    println!("FinTrack summary");
    println!("{}", "─".repeat(40));
    println!("  Expenses:   {}", state.expenses.len());
    println!("  Spent:      {}", format_vnd(total));
    if analytics::budget_is_configured(state.budget) {
        println!("  Budget:     {}", format_vnd(state.budget));
        println!(
            "  Used:       {}%",
            analytics::budget_utilization(total, state.budget)
        );
        println!(
            "  Remaining:  {}",
            format_vnd(analytics::remaining_budget(total, state.budget))
        );
    } else {
        println!("  Budget:     not set");
    }

    let breakdown = analytics::category_breakdown(&state.expenses, Category::all());
    if !breakdown.is_empty() {
        println!();
        println!("Spending by Category:");
        for row in &breakdown {
            println!(
                "  {:<12} {:>14} {:>4}%",
                row.category.label(),
                format_vnd(row.total),
                analytics::category_share(row.total, total)
            );
        }
    }

    Ok(())
}

fn cli_advise(db: &mut Database, service: &dyn AdviceService) -> Result<()> {
    let state = db.load_state();
    if !state.expenses.is_empty() {
        eprintln!("Đang phân tích...");
    }
    println!(
        "{}",
        advice::request_advice(&state.expenses, state.budget, service)
    );
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| super::shellexpand(a))
        .unwrap_or_else(super::default_export_path);

    let count = db.export_to_csv(&output_path, &db.load_expenses())?;
    if count == 0 {
        println!("No expenses to export");
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
    Ok(())
}

fn cli_categories() {
    println!("{:<4} {:<12} Short name", "", "Category");
    for category in Category::all() {
        println!(
            "{:<4} {:<12} {}",
            category.icon(),
            category.label(),
            category.alias()
        );
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_skips_flag_values() {
        let a = args(&["50000", "an-uong", "--note", "Phở", "--date", "2024-05-01"]);
        assert_eq!(positional(&a, &["--date", "--note"]), ["50000", "an-uong"]);
        assert_eq!(flag_value(&a, "--note"), Some("Phở"));
        assert_eq!(flag_value(&a, "--date"), Some("2024-05-01"));
        assert_eq!(flag_value(&a, "--missing"), None);
    }

    #[test]
    fn test_positional_drops_bare_flags() {
        let a = args(&["--yes", "1716000000000"]);
        assert_eq!(positional(&a, &[]), ["1716000000000"]);
        assert!(has_flag(&a, "--yes"));
    }

    #[test]
    fn test_is_yes() {
        for yes in ["y", "Y", "yes\n", " YES ", "có"] {
            assert!(is_yes(yes), "{yes}");
        }
        for no in ["", "n", "no", "maybe", "\n"] {
            assert!(!is_yes(no), "{no}");
        }
    }

    #[test]
    fn test_run_action_applies_and_persists() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(run_action(&mut db, Action::SetBudget(42), &mut Answered(true)).unwrap());
        assert_eq!(db.load_budget(), 42);
    }

    #[test]
    fn test_run_action_declined() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_budget(7).unwrap();
        let applied = run_action(&mut db, Action::ResetAll, &mut Answered(false)).unwrap();
        assert!(!applied);
        assert_eq!(db.load_budget(), 7);
    }

    #[test]
    fn test_run_action_unknown_id() {
        let mut db = Database::open_in_memory().unwrap();
        let err = run_action(
            &mut db,
            Action::DeleteExpense(ExpenseId::new("404")),
            &mut Answered(true),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "No expense with id 404");
    }

    #[test]
    fn test_cli_add_then_delete() {
        let mut db = Database::open_in_memory().unwrap();
        cli_add(
            &args(&["30000", "di-chuyen", "--date", "2024-05-01", "--note", "Grab"]),
            &mut db,
        )
        .unwrap();
        let expenses = db.load_expenses();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].category, Category::Transport);
        assert_eq!(expenses[0].note, "Grab");

        let id = expenses[0].id.to_string();
        cli_delete(&args(&[id.as_str(), "--yes"]), &mut db).unwrap();
        assert!(db.load_expenses().is_empty());
    }

    #[test]
    fn test_cli_add_rejects_bad_input() {
        let mut db = Database::open_in_memory().unwrap();
        let err = cli_add(&args(&["50000", "du-lich"]), &mut db).unwrap_err();
        assert_eq!(err.to_string(), "Unknown category: 'du-lich'");
        let err = cli_add(&args(&["abc", "khac"]), &mut db).unwrap_err();
        assert!(err.to_string().starts_with("Invalid amount"));
        assert!(db.load_expenses().is_empty());
    }
}
