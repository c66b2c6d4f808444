//! Shared error types including the API error envelope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error envelope returned by the API on non-2xx statuses.
///
/// The `message` field is optional on the wire; clients fall back to a
/// generic message when it is missing or the body is not valid JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Attempt to parse an error envelope into a user-facing message.
///
/// Returns `None` for non-JSON bodies and for blank messages, so callers can
/// substitute their own fallback string.
pub fn try_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;
    let message = parsed.message?;
    if message.trim().is_empty() {
        return None;
    }
    Some(message)
}

/// API error type for client-side use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport-level failure: no response was received at all.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// A response arrived but its body could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialize(String),
}

impl ApiError {
    /// Whether the server rejected the request as unauthenticated.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401, .. })
    }

    /// The server-provided message, if the response body carried one.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::Http { body, .. } => try_error_message(body),
            _ => None,
        }
    }
}
