//! Endpoint selection for the Open Collective GraphQL API.
//!
//! The client targets one of two fixed endpoints. Staging is always the
//! default: mutating live financial data requires an explicit opt-in.
//!
//! Selection priority, highest first:
//!
//! 1. An explicit endpoint URL.
//! 2. An explicit "use production" flag.
//! 3. Best-effort inference from the secret reference string (a `op://...`
//!    style reference usually embeds the API hostname it was issued for).
//! 4. The staging default.

/// The production GraphQL v2 endpoint.
pub const PROD_URL: &str = "https://api.opencollective.com/graphql/v2";

/// The staging GraphQL v2 endpoint.
pub const STAGING_URL: &str = "https://api-staging.opencollective.com/graphql/v2";

/// A resolved endpoint together with its production opt-in state.
///
/// `allow_production` records whether the operator explicitly chose the
/// endpoint (explicit URL or production flag). [`Session`](crate::Session)
/// construction rejects the production URL when this is `false`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// The GraphQL endpoint URL.
    pub url: String,
    /// Whether production use was explicitly requested.
    pub allow_production: bool,
}

impl Endpoint {
    /// Returns `true` if this endpoint is the known production URL.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.url == PROD_URL
    }
}

/// Resolves an endpoint from the available inputs, in priority order.
///
/// An explicit URL is trusted as-is and counts as opt-in even when it is
/// the production URL. The `use_production` flag selects [`PROD_URL`].
/// Otherwise the secret reference is inspected: a reference mentioning the
/// staging hostname selects staging, one mentioning the production hostname
/// selects the production URL but never grants opt-in on its own. A
/// reference matching neither, or no reference at all, falls back to
/// staging. Failed inference is not an error.
#[must_use]
pub fn resolve_endpoint(
    explicit_url: Option<&str>,
    use_production: bool,
    secret_ref: Option<&str>,
) -> Endpoint {
    if let Some(url) = explicit_url {
        return Endpoint {
            url: url.to_string(),
            allow_production: true,
        };
    }
    if use_production {
        return Endpoint {
            url: PROD_URL.to_string(),
            allow_production: true,
        };
    }
    if let Some(reference) = secret_ref {
        // Staging hostname is a substring-superset of the production one,
        // so it must be checked first.
        if reference.contains("api-staging.opencollective.com") {
            return Endpoint {
                url: STAGING_URL.to_string(),
                allow_production: false,
            };
        }
        if reference.contains("api.opencollective.com") {
            tracing::debug!("secret reference points at production; explicit opt-in still required");
            return Endpoint {
                url: PROD_URL.to_string(),
                allow_production: false,
            };
        }
    }
    Endpoint {
        url: STAGING_URL.to_string(),
        allow_production: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_url_wins_over_everything() {
        let endpoint = resolve_endpoint(
            Some("http://localhost:3060/graphql/v2"),
            true,
            Some("op://vault/api.opencollective.com/credential"),
        );
        assert_eq!(endpoint.url, "http://localhost:3060/graphql/v2");
        assert!(endpoint.allow_production);
    }

    #[test]
    fn test_production_flag_selects_prod_with_opt_in() {
        let endpoint = resolve_endpoint(None, true, None);
        assert_eq!(endpoint.url, PROD_URL);
        assert!(endpoint.allow_production);
        assert!(endpoint.is_production());
    }

    #[test]
    fn test_staging_secret_ref_infers_staging() {
        let endpoint = resolve_endpoint(
            None,
            false,
            Some("op://startmeup.nz/api-staging.opencollective.com/credential"),
        );
        assert_eq!(endpoint.url, STAGING_URL);
        assert!(!endpoint.allow_production);
    }

    #[test]
    fn test_production_secret_ref_infers_prod_without_opt_in() {
        let endpoint = resolve_endpoint(
            None,
            false,
            Some("op://startmeup.nz/api.opencollective.com/credential"),
        );
        assert_eq!(endpoint.url, PROD_URL);
        assert!(!endpoint.allow_production);
    }

    #[test]
    fn test_unrecognized_secret_ref_defaults_to_staging() {
        let endpoint = resolve_endpoint(None, false, Some("op://vault/something-else/credential"));
        assert_eq!(endpoint.url, STAGING_URL);
    }

    #[test]
    fn test_no_inputs_defaults_to_staging() {
        let endpoint = resolve_endpoint(None, false, None);
        assert_eq!(endpoint.url, STAGING_URL);
        assert!(!endpoint.allow_production);
        assert!(!endpoint.is_production());
    }
}
