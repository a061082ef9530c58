//! Application configuration
//!
//! Stored as JSON in the user's config directory:
//! - Linux: ~/.config/facade-admin/config.json
//! - macOS: ~/Library/Application Support/facade-admin/config.json
//! - Windows: %APPDATA%\facade-admin\config.json
//!
//! A missing file means defaults. A few fields can be overridden from the
//! environment so credentials need not be written to disk.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::state::data::Section;
use crate::state::ops::EditPolicy;

pub const ENV_URL: &str = "FACADE_ADMIN_URL";
pub const ENV_CSRF: &str = "FACADE_ADMIN_CSRF";
pub const ENV_SESSION: &str = "FACADE_ADMIN_SESSION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend root, e.g. `https://catalog.example.com`
    pub base_url: String,
    /// Section shown at startup
    pub section: Section,
    pub csrf_token: Option<String>,
    /// Raw cookie pair(s) of an authenticated session, e.g. `sessionid=...`
    pub session_cookie: Option<String>,
    /// Queue renames instead of applying them right away
    pub defer_renames: bool,
    pub request_timeout_secs: u64,
    /// Idle time before the showcase asks whether someone is still there
    pub inactivity_delay_secs: u64,
    pub countdown_secs: u64,
    pub current_user_id: Option<i64>,
    pub is_admin: bool,
    /// Anonymous analytics identifier, generated on first run
    pub client_id: Option<String>,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            section: Section::Facades,
            csrf_token: None,
            session_cookie: None,
            defer_renames: false,
            request_timeout_secs: 30,
            inactivity_delay_secs: 60,
            countdown_secs: 15,
            current_user_id: None,
            is_admin: false,
            client_id: None,
            log_filter: "facade_admin=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the path where the config file should be stored
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("facade-admin");
        path.push("config.json");
        path
    }

    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io { path: path.to_path_buf(), source });
            }
        };
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_CSRF) {
            self.csrf_token = Some(token);
        }
        if let Some(cookie) = lookup(ENV_SESSION) {
            self.session_cookie = Some(cookie);
        }
    }

    /// Make sure an analytics client id exists. Returns true if one was
    /// generated and the config should be saved.
    pub fn ensure_client_id(&mut self) -> bool {
        if self.client_id.as_deref().is_some_and(|id| !id.is_empty()) {
            return false;
        }
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        self.client_id = Some(format!("{:x}{:x}", nanos, std::process::id()));
        true
    }

    pub fn edit_policy(&self) -> EditPolicy {
        EditPolicy { defer_renames: self.defer_renames }
    }
}
