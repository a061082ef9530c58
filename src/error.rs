//! Error types shared across the client.
//!
//! `ApiError` is `Clone` because results travel inside iced messages.

use std::path::PathBuf;

use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("{method} {path} failed with status {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        detail: Option<String>,
    },

    #[error("invalid response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("cannot read upload file {path}: {message}")]
    Upload { path: PathBuf, message: String },
}

impl ApiError {
    /// Server-provided `{"error": "..."}` message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Local edits rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("a name is required")]
    EmptyName,

    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("unknown color: {0}")]
    UnknownColor(i64),

    #[error("pending changes must be saved or cancelled first")]
    PendingChanges,

    #[error("an email address is required")]
    MissingEmail,
}

/// Failure of a batch save.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// Replay stopped at `index`; earlier operations reached the server.
    #[error("save stopped at step {} ({action}): {source}", .index + 1)]
    Replay {
        index: usize,
        action: String,
        #[source]
        source: ApiError,
    },

    #[error("changes saved, but the catalog could not be refreshed: {0}")]
    Refresh(#[source] ApiError),
}

/// Failure while loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_exposes_server_detail() {
        let err = ApiError::Status {
            method: "POST",
            path: "/api/users/".into(),
            status: 400,
            detail: Some("email is required".into()),
        };
        assert_eq!(err.detail(), Some("email is required"));
        assert_eq!(err.to_string(), "POST /api/users/ failed with status 400");
    }

    #[test]
    fn network_error_has_no_detail() {
        assert_eq!(ApiError::Network("refused".into()).detail(), None);
    }
}
