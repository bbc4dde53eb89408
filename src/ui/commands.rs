use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{Local, Utc};

use super::app::{App, Screen};
use crate::db::Database;
use crate::error::ValidationError;
use crate::models::{Category, ExpenseId};
use crate::state::{parse_budget, Action, ExpenseDraft};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit FinTrack", cmd_quit, r);
    register_command!("quit", "Quit FinTrack", cmd_quit, r);
    register_command!("home", "Go to Home", cmd_home, r);
    register_command!("stats", "Go to Stats", cmd_stats, r);
    register_command!("settings", "Go to Settings", cmd_settings, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!(
        "add",
        "Add expense (e.g. :add 50000 an-uong Phở bò)",
        cmd_add,
        r
    );
    register_command!("new", "Open the add-expense form", cmd_new, r);
    register_command!("n", "Open the add-expense form", cmd_new, r);
    register_command!(
        "delete",
        "Delete selected expense, or one by id (e.g. :delete 1716000000000)",
        cmd_delete,
        r
    );
    register_command!("reset", "Delete every expense", cmd_reset, r);
    register_command!(
        "budget",
        "Set the budget limit (e.g. :budget 5000000)",
        cmd_budget,
        r
    );
    register_command!("advise", "Ask the AI assistant for advice", cmd_advise, r);
    register_command!("ai", "Ask the AI assistant for advice", cmd_advise, r);
    register_command!(
        "export",
        "Export expenses to CSV (e.g. :export ~/chi-tieu.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 2) // skip short aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_home(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Home;
    Ok(())
}

fn cmd_stats(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Stats;
    Ok(())
}

fn cmd_settings(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Settings;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_new(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.open_form();
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.open_form();
        return Ok(());
    }

    let mut parts = args.splitn(3, ' ');
    let amount = parts.next().unwrap_or("");
    let Some(category_arg) = parts.next() else {
        app.set_status("Usage: :add <amount> <category> [note]");
        return Ok(());
    };
    let note = parts.next().unwrap_or("");

    let Some(category) = Category::parse(category_arg) else {
        app.set_status(ValidationError::UnknownCategory(category_arg.to_string()).to_string());
        return Ok(());
    };

    let draft = ExpenseDraft {
        amount: amount.to_string(),
        category,
        note: note.to_string(),
        ..ExpenseDraft::new(Local::now().date_naive())
    };
    match draft.validate(&app.state.expenses, Utc::now().timestamp_millis()) {
        Ok(expense) => app.request(Action::AddExpense(expense), db),
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_delete(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let id = if args.is_empty() {
        match app.selected_expense() {
            Some(expense) => expense.id.clone(),
            None => {
                app.set_status("No expense selected");
                return Ok(());
            }
        }
    } else {
        ExpenseId::new(args)
    };
    app.request(Action::DeleteExpense(id), db);
    Ok(())
}

fn cmd_reset(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.request(Action::ResetAll, db);
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status(format!(
            "Budget: {}. Usage: :budget <amount>",
            crate::format::format_vnd(app.state.budget)
        ));
        return Ok(());
    }
    match parse_budget(args) {
        Ok(limit) => app.request(Action::SetBudget(limit), db),
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_advise(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.start_advice();
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        crate::run::default_export_path()
    } else {
        crate::run::shellexpand(args)
    };

    match db.export_to_csv(&path, &app.state.expenses) {
        Ok(0) => app.set_status("No expenses to export"),
        Ok(count) => app.set_status(format!("Exported {count} expenses to {path}")),
        Err(e) => app.set_status(format!("Export failed: {e}")),
    }
    Ok(())
}
