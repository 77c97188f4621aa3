//! Client error types

use serde::Deserialize;
use thiserror::Error;

use quiesce_common::ValidationError;

/// Shown when a failed submission carries no usable message
pub const GENERIC_CREATE_FAILURE: &str = "Failed to create maintenance window.";

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Domain(#[from] quiesce_common::Error),

    #[error("Failed to create auto-tagging rule. The maintenance window was not created.")]
    AutoTagNotCreated,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Error object returned by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Pull `error.message` out of a platform error body
pub fn remote_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
}

impl ClientError {
    /// Text to show an operator: the platform's own message when there is
    /// one, then the raw response body, then a generic fallback
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => remote_message(message)
                .or_else(|| Some(message.trim().to_string()).filter(|m| !m.is_empty()))
                .unwrap_or_else(|| GENERIC_CREATE_FAILURE.to_string()),
            other => {
                let message = other.to_string();
                if message.trim().is_empty() {
                    GENERIC_CREATE_FAILURE.to_string()
                } else {
                    message
                }
            }
        }
    }

    /// Validation failures never reach the network
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
