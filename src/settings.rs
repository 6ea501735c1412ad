//! Runtime configuration.
//!
//! Layered, later wins:
//!   1. built-in defaults (`screenshots/`, `log.txt`, 100 ms, Monitor)
//!   2. `<config_dir>/click-spy/settings.json`, every field optional
//!   3. `CLICKSPY_*` environment variables (`.env.local` / `.env` are
//!      loaded into the environment first)
//!
//! Bad values are skipped with a warning; configuration never stops start-up.

use crate::capture::CaptureMode;
use crate::worker::DEFAULT_POLL_INTERVAL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_OUTPUT_DIR: &str = "CLICKSPY_OUTPUT_DIR";
pub const ENV_LOG_FILE: &str = "CLICKSPY_LOG_FILE";
pub const ENV_POLL_MS: &str = "CLICKSPY_POLL_MS";
pub const ENV_MODE: &str = "CLICKSPY_MODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub poll_interval: Duration,
    pub initial_mode: CaptureMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("screenshots"),
            log_file: PathBuf::from("log.txt"),
            poll_interval: DEFAULT_POLL_INTERVAL,
            initial_mode: CaptureMode::Monitor,
        }
    }
}

/// On-disk shape of `settings.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SettingsFile {
    output_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
    poll_interval_ms: Option<u64>,
    mode: Option<CaptureMode>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Location of the optional settings file.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("click-spy")
        .join("settings.json")
}

/// Loads `.env.local`, else `.env`, from the working directory.
///
/// Runs before the logger is initialised, so it reports on stderr.
pub fn load_dotenv() {
    for env_file in [".env.local", ".env"] {
        let path = Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break;
        }
    }
}

impl Settings {
    /// Defaults, then the settings file, then the process environment.
    pub fn load() -> Self {
        let mut settings = Self::default();

        let path = settings_path();
        match std::fs::read_to_string(&path) {
            Ok(raw) => match settings.apply_json(&raw) {
                Ok(()) => log::info!("[CONFIG] Loaded {}", path.display()),
                Err(e) => log::warn!("[CONFIG] Ignoring {}: {}", path.display(), e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => log::warn!("[CONFIG] {}", SettingsError::Read { path, source }),
        }

        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Overlays the fields present in a `settings.json` document.
    pub fn apply_json(&mut self, raw: &str) -> Result<(), SettingsError> {
        let file: SettingsFile = serde_json::from_str(raw)?;
        if let Some(dir) = file.output_dir {
            self.output_dir = dir;
        }
        if let Some(log_file) = file.log_file {
            self.log_file = log_file;
        }
        if let Some(ms) = file.poll_interval_ms {
            self.poll_interval = poll_interval(ms);
        }
        if let Some(mode) = file.mode {
            self.initial_mode = mode;
        }
        Ok(())
    }

    /// Overlays `CLICKSPY_*` variables looked up through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = value(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(log_file) = value(ENV_LOG_FILE) {
            self.log_file = PathBuf::from(log_file);
        }
        if let Some(raw) = value(ENV_POLL_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => self.poll_interval = poll_interval(ms),
                Err(e) => log::warn!("[CONFIG] Ignoring {}={:?}: {}", ENV_POLL_MS, raw, e),
            }
        }
        if let Some(raw) = value(ENV_MODE) {
            match raw.parse::<CaptureMode>() {
                Ok(mode) => self.initial_mode = mode,
                Err(e) => log::warn!("[CONFIG] Ignoring {}: {}", ENV_MODE, e),
            }
        }
    }
}

fn poll_interval(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}
