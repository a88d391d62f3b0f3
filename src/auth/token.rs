//! Token resolution.
//!
//! The actual secret store (1Password, Vault, CI secret injection) is an
//! external collaborator. This module only defines the boundary: given a
//! secret reference, produce a token string or fail. An explicit override
//! always wins over reference resolution.

use crate::error::ConfigError;

/// Environment variable holding an explicit token override.
pub const TOKEN_ENV_VAR: &str = "OC_TOKEN";

/// Environment variable holding a secret reference (e.g. an `op://...` URI).
pub const SECRET_REF_ENV_VAR: &str = "OC_SECRET_REF";

/// A source capable of turning a secret reference into a token.
///
/// Implementations wrap whatever secret manager the operator uses. The
/// library never shells out or talks to a secret store itself.
pub trait TokenSource {
    /// Resolves `reference` to a token string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the reference cannot be resolved.
    fn resolve(&self, reference: &str) -> Result<String, ConfigError>;
}

/// Resolves a token from an explicit override or the `OC_TOKEN` variable.
///
/// # Errors
///
/// Returns [`ConfigError::MissingToken`] when neither source is set and
/// [`ConfigError::EmptyToken`] when the resolved value is empty.
pub fn resolve_token(override_token: Option<&str>) -> Result<String, ConfigError> {
    let token = match override_token {
        Some(token) => token.to_string(),
        None => std::env::var(TOKEN_ENV_VAR).map_err(|_| ConfigError::MissingToken)?,
    };
    if token.is_empty() {
        return Err(ConfigError::EmptyToken);
    }
    Ok(token)
}

/// Resolves a token, consulting a [`TokenSource`] for the secret reference.
///
/// Priority: explicit override, then `OC_TOKEN`, then `OC_SECRET_REF`
/// resolved through `source`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingToken`] when no source yields a token, or
/// whatever error the `TokenSource` reports.
pub fn resolve_token_with(
    override_token: Option<&str>,
    source: &dyn TokenSource,
) -> Result<String, ConfigError> {
    match resolve_token(override_token) {
        Err(ConfigError::MissingToken) => {}
        other => return other,
    }
    let reference = std::env::var(SECRET_REF_ENV_VAR).map_err(|_| ConfigError::MissingToken)?;
    let token = source.resolve(&reference)?;
    if token.is_empty() {
        return Err(ConfigError::EmptyToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(&'static str);

    impl TokenSource for FixedSource {
        fn resolve(&self, _reference: &str) -> Result<String, ConfigError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSource;

    impl TokenSource for FailingSource {
        fn resolve(&self, _reference: &str) -> Result<String, ConfigError> {
            Err(ConfigError::MissingToken)
        }
    }

    #[test]
    fn test_explicit_override_wins() {
        let token = resolve_token(Some("override")).unwrap();
        assert_eq!(token, "override");
    }

    #[test]
    fn test_empty_override_is_rejected() {
        assert!(matches!(resolve_token(Some("")), Err(ConfigError::EmptyToken)));
    }

    #[test]
    fn test_override_wins_over_source() {
        let token = resolve_token_with(Some("override"), &FixedSource("resolved")).unwrap();
        assert_eq!(token, "override");
    }

    #[test]
    fn test_source_errors_propagate() {
        // No override and no OC_TOKEN in the test environment means the
        // reference path is consulted only when OC_SECRET_REF is set; with
        // neither set the result is MissingToken.
        if std::env::var(TOKEN_ENV_VAR).is_err() && std::env::var(SECRET_REF_ENV_VAR).is_err() {
            let result = resolve_token_with(None, &FailingSource);
            assert!(matches!(result, Err(ConfigError::MissingToken)));
        }
    }
}
