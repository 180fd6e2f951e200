//! Dispatch error types

use std::time::Duration;
use thiserror::Error;

/// Transport-layer errors
///
/// Localized to a single unit of work (one edge push, one query); recorded
/// as an error outcome and never propagated past the harness.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invocation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Node returned error: {status} - {body}")]
    BadStatus { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No endpoint registered for node '{0}'")]
    UnknownNode(String),
}

/// Configuration-level failures that make dispatch impossible
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No endpoint registered for topology node '{0}'")]
    MissingEndpoint(String),
}

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;
