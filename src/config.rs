use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_BUDGET;

pub(crate) const CONFIG_FILE: &str = "config.json";
pub(crate) const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
const FALLBACK_API_KEY_ENV: &str = "API_KEY";
const DATA_DIR_ENV: &str = "FINTRACK_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Budget used until the user sets one.
    pub(crate) default_budget: i64,
    /// Fallback log filter when `FINTRACK_LOG` is unset.
    pub(crate) log_level: String,
    pub(crate) advice: AdviceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_budget: DEFAULT_BUDGET,
            log_level: "info".into(),
            advice: AdviceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AdviceConfig {
    pub(crate) endpoint: String,
    pub(crate) model: String,
    /// Name of the environment variable holding the API key.
    pub(crate) api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) timeout_secs: Option<u64>,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-3-flash-preview".into(),
            api_key_env: DEFAULT_API_KEY_ENV.into(),
            timeout_secs: None,
        }
    }
}

impl AdviceConfig {
    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub(crate) fn api_key(&self) -> Option<String> {
        [self.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|v| !v.trim().is_empty())
    }
}

impl Config {
    /// Read `path`. A missing file gives the defaults; a malformed one is an error
    /// the caller may recover from with [`Config::default`].
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config: {}", path.display()))
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed config: {}", path.display()))
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }
}

/// Where the database, log and config live.
pub(crate) struct Paths {
    pub(crate) data_dir: PathBuf,
    pub(crate) config_dir: PathBuf,
}

impl Paths {
    pub(crate) fn resolve() -> Result<Self> {
        let (data_dir, config_dir) = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                (dir.clone(), dir)
            }
            None => {
                let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "FinTrack")
                    .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
                (
                    proj_dirs.data_dir().to_path_buf(),
                    proj_dirs.config_dir().to_path_buf(),
                )
            }
        };
        for dir in [&data_dir, &config_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(Self {
            data_dir,
            config_dir,
        })
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.data_dir.join("fintrack.db")
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join("fintrack.log")
    }

    pub(crate) fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}
