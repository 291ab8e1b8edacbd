//! Error types shared by the library.

use thiserror::Error;

use crate::plugin::Ecosystem;

/// Errors that can occur while scanning, testing or monitoring.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote service answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{ecosystem} plugin failed: {message}")]
    Plugin {
        ecosystem: Ecosystem,
        message: String,
    },

    #[error("No API token configured. Set ECOSCAN_TOKEN or add `token` to the config file")]
    MissingToken,

    #[error("Configuration error: {0}")]
    Config(String),

    /// At least one monitor submission failed. Carries the full combined report.
    #[error("{0}")]
    MonitorFailed(String),
}

impl Error {
    pub fn plugin(ecosystem: Ecosystem, message: impl Into<String>) -> Self {
        Error::Plugin {
            ecosystem,
            message: message.into(),
        }
    }

    /// Returns the HTTP status when the remote service rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for 4xx responses. These abort a whole test or monitor run.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if (400..500).contains(status))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
