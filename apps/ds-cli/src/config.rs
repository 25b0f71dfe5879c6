//! Application configuration structures

use std::path::{Path, PathBuf};

use anyhow::Context;
use ds_photo::PhotoConfig;
use ds_storage::DEFAULT_MAX_VALUE_BYTES;
use serde::{Deserialize, Serialize};

/// Directory name used under the platform data dir.
const APP_DIR: &str = "daily-streak";

/// Top-level configuration from `<data_dir>/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Durable storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Progress photo sizing
    #[serde(default)]
    pub photos: PhotoConfig,

    /// Daily reminder configuration
    #[serde(default)]
    pub reminders: ReminderConfig,
}

/// Durable storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where goals are stored (defaults to the platform data dir)
    pub data_dir: Option<PathBuf>,

    /// Largest single value the store will write, in bytes
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,

    /// Optional JSONL file recording every goal change
    pub activity_log: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_value_bytes: default_max_value_bytes(),
            activity_log: None,
        }
    }
}

fn default_max_value_bytes() -> usize {
    DEFAULT_MAX_VALUE_BYTES
}

/// Daily reminder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Run the once-a-day reminder check on startup
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also raise a desktop notification through terminal escape codes
    #[serde(default)]
    pub terminal: bool,

    /// Optional JSONL file recording every reminder that fired
    pub log_file: Option<PathBuf>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            terminal: false,
            log_file: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load config, returning defaults if the file doesn't exist.
    ///
    /// A file that exists but doesn't parse is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Platform default data directory, falling back to `./.daily-streak`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".daily-streak"))
}

/// Resolved locations for one run of the CLI.
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
}

impl Paths {
    /// Precedence: command-line flag, then config file, then platform default.
    pub fn resolve(
        data_dir_flag: Option<&Path>,
        config_flag: Option<&Path>,
    ) -> anyhow::Result<(Self, AppConfig)> {
        let base = data_dir_flag
            .map(Path::to_path_buf)
            .unwrap_or_else(default_data_dir);
        let config_file = config_flag
            .map(Path::to_path_buf)
            .unwrap_or_else(|| base.join("config.toml"));
        let config = AppConfig::load_or_default(&config_file)?;

        let data_dir = match (data_dir_flag, &config.storage.data_dir) {
            (Some(flag), _) => flag.to_path_buf(),
            (None, Some(configured)) => configured.clone(),
            (None, None) => base,
        };

        Ok((
            Self {
                data_dir,
                config_file,
            },
            config,
        ))
    }
}
