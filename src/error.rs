//! Configuration error types.
//!
//! This module contains the error type used for fail-fast validation when
//! resolving tokens, selecting endpoints, and loading batch input files.
//!
//! # Error Handling
//!
//! Configuration problems are never retried: they indicate the invocation
//! itself is wrong (missing token, accidental production use, malformed
//! batch file) and must be fixed by the operator.

use thiserror::Error;

/// Errors that can occur while configuring a client invocation.
///
/// Each variant carries enough context to be actionable without exposing
/// secret material.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The resolved endpoint is the production API but production use was
    /// not explicitly allowed. This is a safety rail against mutating live
    /// financial data from scripts intended for staging.
    #[error("Refusing to use production endpoint '{url}' without explicit opt-in. Pass --prod or an explicit --api-url to confirm.")]
    ProductionNotAllowed {
        /// The production URL that was resolved.
        url: String,
    },

    /// No API token could be resolved from any configured source.
    #[error("No API token available. Set OC_TOKEN, or export OC_SECRET_REF and resolve it through your secret manager.")]
    MissingToken,

    /// The auth token is present but empty.
    #[error("API token is empty. Check the value of OC_TOKEN / the resolved secret.")]
    EmptyToken,

    /// A batch input file could not be read.
    #[error("Cannot read batch file '{path}': {source}")]
    BatchFileUnreadable {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A batch input file did not parse as YAML or JSON.
    #[error("Batch file '{path}' is not valid {format}: {reason}")]
    BatchFileInvalid {
        /// Path that was attempted.
        path: String,
        /// Expected format, derived from the file extension.
        format: &'static str,
        /// Parser error message.
        reason: String,
    },

    /// The top-level value of a batch file was not a list.
    #[error("Batch file '{path}' must contain a top-level array of records.")]
    BatchFileNotAList {
        /// Path that was attempted.
        path: String,
    },
}
