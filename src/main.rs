mod advice;
mod analytics;
mod config;
mod db;
mod error;
mod format;
mod logging;
mod models;
mod run;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Result;

use advice::gemini::GeminiClient;
use config::{Config, Paths};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let paths = Paths::resolve()?;

    let config_path = paths.config_path();
    let (config, config_error) = match Config::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    logging::init(&paths.log_path(), &config.log_level)?;
    if let Some(e) = config_error {
        tracing::warn!(error = ?e, "using default config");
    } else if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            tracing::warn!(error = ?e, "could not write default config");
        }
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %paths.data_dir.display(),
        "starting fintrack"
    );

    let mut db = db::Database::open(&paths.db_path(), config.default_budget)?;
    let service = Arc::new(GeminiClient::new(&config.advice));

    match args.len() {
        1 => run::as_tui(&mut db, service),
        _ => run::as_cli(&args, &mut db, service.as_ref()),
    }
}
