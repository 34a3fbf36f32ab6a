//! Persisted configuration for pkghint
//!
//! A small JSON settings file under the user's home directory holding the
//! detected system profile and the log level. The hook entry points only
//! read it; the setup flow is the single writer. The last-executed command
//! line travels separately through an environment variable exported by the
//! shell integration, never through this file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pm::PmFamily;
use crate::profile::SystemProfile;

/// Environment variable carrying the last-executed command line, exported
/// by the shell hook's DEBUG trap.
pub const LAST_COMMAND_ENV: &str = "PKGHINT_LAST_CMD";

const SETTINGS_DIR: &str = ".pkghint";
const SETTINGS_FILE: &str = "config.json";

/// Persisted settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub os: String,
    pub family: PmFamily,
    pub distro_id: String,
    pub distro_version: String,
    pub distro_pretty: String,
    pub log_level: String,
    /// When the settings were last written.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Settings {
    /// Snapshot a detected profile into settings.
    pub fn from_profile(profile: &SystemProfile) -> Self {
        Self {
            os: profile.os.clone(),
            family: profile.family,
            distro_id: profile.distro_id.clone(),
            distro_version: profile.distro_version.clone(),
            distro_pretty: profile.distro_pretty.clone(),
            log_level: "info".to_string(),
            updated_at: chrono::Utc::now(),
        }
    }

    /// `~/.pkghint/config.json`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(SETTINGS_DIR).join(SETTINGS_FILE)
    }

    /// Load from the default path. A missing or unreadable file yields
    /// `None`; the hooks must keep working on a system that was never
    /// set up, they just fall back to live detection.
    pub fn load() -> Option<Settings> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Option<Settings> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e,
                    "settings file unreadable, ignoring it");
                None
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("failed to create settings directory")?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .context(format!("failed to write settings: {:?}", path))?;

        Ok(())
    }
}

/// The command line captured by the shell hook for the exited-with-error
/// trigger, if any.
pub fn last_command() -> Option<String> {
    std::env::var(LAST_COMMAND_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
}
