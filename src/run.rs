mod cli;
mod tui;

pub(crate) use cli::as_cli;
pub(crate) use tui::as_tui;

/// Expand a leading `~/` to `$HOME`.
pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

/// `$HOME/fintrack-export-<today>.csv`
pub(crate) fn default_export_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    let today = chrono::Local::now().format("%Y-%m-%d");
    format!("{home}/fintrack-export-{today}.csv")
}
