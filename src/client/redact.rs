//! Token redaction helpers.
//!
//! Every error message that can reach logs or user-facing output passes
//! through [`redact`] so the active token never appears verbatim. In debug
//! mode a short, non-reversible fingerprint can be attached instead to let
//! operators correlate errors with a specific credential.

use sha2::{Digest, Sha256};

/// Marker substituted for the token in redacted text.
pub const REDACTION_MARKER: &str = "***REDACTED***";

/// Replaces every occurrence of `token` in `text` with the redaction marker.
///
/// Empty tokens are ignored; replacing the empty string would corrupt the
/// text.
#[must_use]
pub fn redact(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    text.replace(token, REDACTION_MARKER)
}

/// Returns a short hex prefix of the token's SHA-256 digest.
///
/// The fingerprint identifies a credential without exposing it. Twelve hex
/// characters match what the companion tooling prints.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }
    let digest = Sha256::digest(token.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_removes_all_occurrences() {
        let redacted = redact("token=abc123 retry with abc123", "abc123");
        assert!(!redacted.contains("abc123"));
        assert_eq!(redacted.matches(REDACTION_MARKER).count(), 2);
    }

    #[test]
    fn test_redact_with_empty_token_is_identity() {
        assert_eq!(redact("body text", ""), "body text");
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = token_fingerprint("secret-token");
        let b = token_fingerprint("secret-token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_does_not_contain_token() {
        let fingerprint = token_fingerprint("hunter2");
        assert!(!fingerprint.contains("hunter2"));
    }

    #[test]
    fn test_fingerprint_of_empty_token_is_empty() {
        assert_eq!(token_fingerprint(""), "");
    }
}
