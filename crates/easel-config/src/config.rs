/// Application configuration: load, save and sanitize.
use std::path::{Path, PathBuf};
use std::time::Duration;

use easel_mod_history::HistoryConfig;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "EASEL_DATA_DIR";

/// Smallest accepted auto-save interval.
const MIN_AUTO_SAVE_INTERVAL_SECS: u64 = 5;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EaselConfig {
    /// Undo steps kept per tool view.
    pub max_history_size: usize,
    /// Whether the active project is saved automatically after edits settle.
    pub auto_save_enabled: bool,
    /// Quiet period in seconds after the last edit before auto-save fires (minimum 5).
    pub auto_save_interval_secs: u64,
    /// Entries kept in each tool's recent-projects list (minimum 1).
    pub max_recent_projects: usize,
    /// Directory holding the store database. Empty = resolved from the environment.
    pub data_dir: String,
}

impl Default for EaselConfig {
    fn default() -> Self {
        Self {
            max_history_size: easel_mod_history::config::DEFAULT_MAX_HISTORY_SIZE,
            auto_save_enabled: true,
            auto_save_interval_secs: 30,
            max_recent_projects: 10,
            data_dir: String::new(),
        }
    }
}

impl EaselConfig {
    /// Returns the config file path: exe directory + `easel.json`.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("easel.json")))
            .unwrap_or_else(|| PathBuf::from("easel.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<EaselConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            let mut config = Self::default();
            config.sanitize();
            config
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges.
    pub fn sanitize(&mut self) {
        self.auto_save_interval_secs = self
            .auto_save_interval_secs
            .max(MIN_AUTO_SAVE_INTERVAL_SECS);
        self.max_recent_projects = self.max_recent_projects.max(1);
        self.data_dir = self.data_dir.trim().to_string();
    }

    /// History settings for a tool view.
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig::with_max_history_size(self.max_history_size)
    }

    /// The auto-save debounce interval, or `None` when auto-save is off.
    pub fn auto_save_interval(&self) -> Option<Duration> {
        self.auto_save_enabled
            .then(|| Duration::from_secs(self.auto_save_interval_secs))
    }

    /// Returns the directory the store database lives in.
    ///
    /// Uses `data_dir` when set, otherwise `resolve_data_dir()`.
    pub fn data_dir(&self) -> PathBuf {
        if self.data_dir.is_empty() {
            resolve_data_dir()
        } else {
            PathBuf::from(&self.data_dir)
        }
    }
}

/// Resolves the default data directory path.
///
/// Resolution order:
/// 1. `EASEL_DATA_DIR` environment variable
/// 2. The platform data directory + `easel/`
/// 3. `.data/` in the working directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("easel"))
        .unwrap_or_else(|| PathBuf::from(".data"))
}
