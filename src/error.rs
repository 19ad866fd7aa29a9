//! Error taxonomy for the reconciliation engine
//!
//! Validation and precondition failures are raised locally and never reach
//! the network. Transport and remote failures are surfaced unchanged to the
//! caller; nothing in this crate retries.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for llmctl operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// One or more declared values violate the resource schema
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An operation that needs an identifier was given an empty one
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// DNS, connect, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx answer from the control plane
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Missing or malformed provider configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Lookup of an entity that must exist (data sources only)
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
}

impl Error {
    /// Create a validation error from a single message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Create a precondition error with the given message
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status of a remote failure, if this is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Remote(remote) => Some(remote.status_code),
            _ => None,
        }
    }

    /// True for a remote 404
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Short operator-facing text for this error.
    ///
    /// Remote errors are mapped by status class so raw service payloads are not
    /// echoed to a terminal; local errors keep their full message since they
    /// only contain what the operator declared.
    pub fn user_message(&self) -> String {
        match self {
            Error::Remote(remote) => match remote.status_code {
                401 => "Authentication failed. Check LITELLM_API_KEY or --api-key.".to_string(),
                403 => "Permission denied for this API key.".to_string(),
                404 => "Resource not found.".to_string(),
                409 => "Resource conflict. The resource may already exist.".to_string(),
                429 => "Rate limit exceeded. Please try again later.".to_string(),
                400 | 422 => format!("Invalid request: {}", truncate(&remote.message, 80)),
                500..=599 => "Control plane temporarily unavailable. Please try again.".to_string(),
                status => format!("Request failed with status {}.", status),
            },
            Error::Transport(e) if e.is_timeout() => {
                "Request timed out. Check the endpoint or raise --timeout.".to_string()
            }
            Error::Transport(_) => {
                "Request failed. Check your network connection and the endpoint.".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    let mut chars = s.chars().filter(|c| c.is_ascii_graphic() || *c == ' ');
    let cleaned: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", cleaned)
    } else {
        cleaned
    }
}

/// Error envelope returned by the control plane for any status >= 400
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}

/// Classified non-2xx response
#[derive(Debug, Clone)]
pub struct RemoteError {
    pub status_code: u16,
    /// `None` when the body could not be parsed as an [`ErrorEnvelope`]
    pub code: Option<String>,
    pub message: String,
    pub details: Option<Value>,
}

impl RemoteError {
    /// Classify an error response body.
    ///
    /// A body that is not a JSON object still yields a `RemoteError`, carrying
    /// the parse failure as its message.
    pub fn from_body(status_code: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(envelope) => Self {
                status_code,
                code: Some(envelope.code),
                message: envelope.message,
                details: envelope.details,
            },
            Err(e) => Self {
                status_code,
                code: None,
                message: format!("failed to parse error response: {}", e),
                details: None,
            },
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(
                f,
                "API error (status {}): {} - {}",
                self.status_code, code, self.message
            ),
            None => write!(f, "API error (status {}): {}", self.status_code, self.message),
        }
    }
}

impl std::error::Error for RemoteError {}
