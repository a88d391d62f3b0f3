//! GraphQL transport: HTTP client, error classification, redaction.

mod errors;
mod http;
mod redact;

pub use errors::{ClientError, GraphqlErrorEntry, GraphqlErrorExtensions};
pub use http::OcClient;
pub use redact::{redact, token_fingerprint, REDACTION_MARKER};
