//! Persisted configuration
//!
//! Lives at `~/.ramses/out_config.json`, shared with the other pipeline
//! add-ons that keep their state under `~/.ramses`. A corrupt or missing
//! file falls back to defaults instead of failing; saves go through a
//! temp file and an atomic rename so a crash never leaves half a config.
//!
//! The config doubles as the project-context and user providers: the
//! desktop daemon the original tool talked to is out of scope, so the
//! active project root/code and the identity used in markers come from
//! here (or from CLI flags overriding it).

use crate::review::error::{ReviewError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config filename under the ramses home
pub const CONFIG_FILE_NAME: &str = "out_config.json";
/// History log filename under the ramses home
pub const HISTORY_FILE_NAME: &str = "upload_history.log";

/// Settings for the review collection workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Destination folder for collected packages, relative to the
    /// project root; empty means the caller must pick one
    pub default_collection_path: String,
}

/// Ramses Out configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutConfig {
    pub review: ReviewSettings,
    /// Active project root on disk
    pub project_root: Option<PathBuf>,
    /// Short project code used in filenames and package names
    pub project_code: Option<String>,
    /// Identity recorded in markers and the history log; falls back to
    /// the system username when absent
    pub user: Option<String>,
}

impl OutConfig {
    /// Load from the default location, falling back to defaults when the
    /// file is absent or corrupt.
    pub fn load() -> Self {
        match default_config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!(error = %e, "Cannot resolve config path, using defaults");
                Self::default()
            }
        }
    }

    /// Load from an explicit path. Corruption is downgraded to defaults
    /// with a warning; this tool must start even with a damaged config.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&default_config_path()?)
    }

    /// Atomic save: write a sibling temp file, then rename over the target.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.persist(path).map_err(|e| ReviewError::Io(e.error))?;
        Ok(())
    }

    /// Identity for markers and history lines: the configured user, else
    /// the system username.
    pub fn current_user(&self) -> String {
        self.user
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| env::var("USER").ok())
            .or_else(|| env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// The shared `~/.ramses` directory, created on demand
pub fn ramses_home() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(ReviewError::NoHomeDir)?.join(".ramses");
    fs::create_dir_all(&home)?;
    Ok(home)
}

/// Default config file location
pub fn default_config_path() -> Result<PathBuf> {
    Ok(ramses_home()?.join(CONFIG_FILE_NAME))
}

/// Default history log location
pub fn default_history_path() -> Result<PathBuf> {
    Ok(ramses_home()?.join(HISTORY_FILE_NAME))
}
