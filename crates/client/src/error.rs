//! Errors returned by the Stockroom client.

use std::sync::Arc;

use stockroom_core::FormErrors;
use thiserror::Error;

use crate::session::StorageError;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: reqwest::StatusCode,
        /// Start of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An API path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// A shared fetch failed; every caller awaiting it sees the same error.
    #[error(transparent)]
    Fetch(Arc<ClientError>),

    /// The background fetch task did not complete.
    #[error("Fetch task failed: {0}")]
    Task(String),

    /// Input was rejected before submission.
    #[error("Validation failed: {0}")]
    Validation(#[from] FormErrors),

    /// The action needs a login or a role the current user lacks.
    #[error("Access denied: {0}")]
    AccessDenied(String),
}

impl ClientError {
    /// Whether the server rejected the request as unauthenticated.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == reqwest::StatusCode::UNAUTHORIZED,
            Self::Fetch(inner) => inner.is_unauthorized(),
            _ => false,
        }
    }
}
