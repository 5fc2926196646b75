//! Error types for idler-core operations.
//!
//! Every variant maps onto one of three failure classes: transport failures,
//! backend-reported failures, and local configuration problems. None of them
//! are fatal to a running tracker.

use std::path::PathBuf;

/// All errors that can occur in idler-core operations.
#[derive(Debug, thiserror::Error)]
pub enum IdlerError {
    // ─────────────────────────────────────────────────────────────────────
    // Backend Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backend returned HTTP {status} for {endpoint}: {}", .message.as_deref().unwrap_or("no message"))]
    Backend {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },

    #[error("Backend rejected {endpoint}: {}", .message.as_deref().unwrap_or("status was not success"))]
    Rejected {
        endpoint: String,
        message: Option<String>,
    },

    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("{0}")]
    SteamUnavailable(String),

    #[error("Invalid game id: {0:?}")]
    InvalidGameId(String),

    #[error("Preset name must not be empty")]
    EmptyPresetName,

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl IdlerError {
    /// The message the backend attached to a failure, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            IdlerError::Backend { message, .. } | IdlerError::Rejected { message, .. } => {
                message.as_deref()
            }
            IdlerError::SteamUnavailable(message) => Some(message),
            IdlerError::PresetNotFound(_) => Some("Preset not found"),
            _ => None,
        }
    }

    /// Text for a user-facing notification: the backend's own words when
    /// present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, IdlerError::Transport { .. })
    }
}

/// Convenience type alias for Results using IdlerError.
pub type Result<T> = std::result::Result<T, IdlerError>;
