//! Reconciler error types.

use thiserror::Error;

use crate::client::ClientError;

/// Errors surfaced by upsert operations.
///
/// Precondition variants are raised before any mutating call is attempted,
/// so a failed precondition never leaves partial work behind.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Transport or remote-operation failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The fiscal host named by a collective record does not exist.
    #[error("Host '{slug}' not found in this environment.")]
    HostNotFound {
        /// The missing host slug.
        slug: String,
    },

    /// The named account exists but is not an active fiscal host.
    #[error("Account '{slug}' exists but is not a fiscal host (isHost=false).")]
    NotAHost {
        /// The non-host account slug.
        slug: String,
    },

    /// The parent collective named by a project record does not exist.
    #[error("Parent collective '{slug}' not found; create it first.")]
    ParentNotFound {
        /// The missing parent slug.
        slug: String,
    },
}

impl OpsError {
    /// Returns `true` for precondition failures raised before any write.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::HostNotFound { .. } | Self::NotAHost { .. } | Self::ParentNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(OpsError::HostNotFound {
            slug: "h".to_string()
        }
        .is_precondition());
        assert!(OpsError::NotAHost {
            slug: "h".to_string()
        }
        .is_precondition());
        assert!(OpsError::ParentNotFound {
            slug: "c".to_string()
        }
        .is_precondition());
        assert!(!OpsError::Client(ClientError::Request {
            code: 500,
            message: "boom".to_string()
        })
        .is_precondition());
    }

    #[test]
    fn test_messages_name_the_slug() {
        let error = OpsError::ParentNotFound {
            slug: "ghost".to_string(),
        };
        assert!(error.to_string().contains("ghost"));
    }
}
