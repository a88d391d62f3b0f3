//! Transport-level error types.
//!
//! One request attempt ends in exactly one of four ways, mirrored by the
//! variants of [`ClientError`] plus the success path:
//!
//! - [`ClientError::Transport`]: the request never produced an HTTP
//!   response (connection refused, DNS failure, timeout). Retryable.
//! - [`ClientError::Request`]: a non-2xx HTTP status. Retryable only for
//!   5xx; the carried message is redacted and 401/403 bodies are withheld
//!   outside debug mode.
//! - [`ClientError::Graphql`]: a 2xx response whose body carries a
//!   non-empty `errors` array. Never retried, since GraphQL errors indicate a
//!   logical or validation problem, not transience. Takes precedence over
//!   any partial `data` in the same response.
//! - [`ClientError::Decode`]: the response body (or a typed `data`
//!   payload) did not match the expected shape.

use serde::Deserialize;
use thiserror::Error;

/// One entry of a GraphQL `errors` array.
///
/// Only the fields this client acts on are declared. `extensions.code` is
/// the structured error code the API attaches to well-known failures
/// (e.g. `NOT_FOUND`); it is preferred over message matching wherever
/// present.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GraphqlErrorEntry {
    /// Human-readable error message.
    pub message: String,
    /// Structured extensions, when the server provides them.
    #[serde(default)]
    pub extensions: Option<GraphqlErrorExtensions>,
}

/// The `extensions` object of a GraphQL error entry.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GraphqlErrorExtensions {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
}

/// Unified error type for GraphQL transport operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or connection error; no HTTP response was received.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP response. The message is already redacted.
    #[error("{message}")]
    Request {
        /// The HTTP status code.
        code: u16,
        /// Redacted description including a body snippet where permitted.
        message: String,
    },

    /// A 2xx response carrying a non-empty GraphQL `errors` array.
    #[error("GraphQL errors: {message}")]
    Graphql {
        /// The first error's message, redacted.
        message: String,
        /// The full error list, messages redacted.
        errors: Vec<GraphqlErrorEntry>,
    },

    /// The response body did not match the expected shape.
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Returns the structured error code of the first GraphQL error, if any.
    #[must_use]
    pub fn graphql_code(&self) -> Option<&str> {
        match self {
            Self::Graphql { errors, .. } => errors
                .first()
                .and_then(|entry| entry.extensions.as_ref())
                .and_then(|ext| ext.code.as_deref()),
            _ => None,
        }
    }
}
