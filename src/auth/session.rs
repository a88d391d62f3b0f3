//! Session management for Open Collective API calls.
//!
//! A [`Session`] fixes the endpoint URL, the auth token, and the auth mode
//! for the lifetime of one invocation. The production guard lives here:
//! constructing a session against the production endpoint fails unless
//! production use was explicitly allowed.

use std::str::FromStr;

use crate::config::{Endpoint, PROD_URL, STAGING_URL};
use crate::error::ConfigError;

/// How the token is presented to the API.
///
/// Open Collective accepts personal tokens via a dedicated `Personal-Token`
/// header and OAuth access tokens via `Authorization: Bearer`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Send the token in the `Personal-Token` header.
    #[default]
    PersonalToken,
    /// Send the token as an `Authorization: Bearer` header.
    Bearer,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "personal" | "personal-token" => Ok(Self::PersonalToken),
            "oauth" | "bearer" => Ok(Self::Bearer),
            other => Err(format!(
                "unknown auth mode '{other}', expected 'personal' or 'oauth'"
            )),
        }
    }
}

/// An authenticated session against one fixed endpoint.
///
/// Sessions are immutable after construction. The endpoint URL never
/// changes for the lifetime of the session, and the production URL is
/// rejected at construction time unless explicitly allowed.
///
/// # Example
///
/// ```rust
/// use opencollective_ops::{AuthMode, Session};
///
/// let session = Session::for_staging("token".to_string(), AuthMode::PersonalToken).unwrap();
/// assert!(!session.is_production());
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    api_url: String,
    token: String,
    auth_mode: AuthMode,
}

impl Session {
    /// Creates a session for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ProductionNotAllowed`] when the endpoint URL
    /// is the production URL and `allow_production` is false, and
    /// [`ConfigError::EmptyToken`] when the token is empty.
    pub fn new(endpoint: Endpoint, token: String, auth_mode: AuthMode) -> Result<Self, ConfigError> {
        if endpoint.url == PROD_URL && !endpoint.allow_production {
            return Err(ConfigError::ProductionNotAllowed { url: endpoint.url });
        }
        if token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        Ok(Self {
            api_url: endpoint.url,
            token,
            auth_mode,
        })
    }

    /// Creates a session against the staging endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] when the token is empty.
    pub fn for_staging(token: String, auth_mode: AuthMode) -> Result<Self, ConfigError> {
        Self::new(
            Endpoint {
                url: STAGING_URL.to_string(),
                allow_production: false,
            },
            token,
            auth_mode,
        )
    }

    /// Creates a session against the production endpoint.
    ///
    /// Calling this constructor *is* the explicit opt-in.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] when the token is empty.
    pub fn for_production(token: String, auth_mode: AuthMode) -> Result<Self, ConfigError> {
        Self::new(
            Endpoint {
                url: PROD_URL.to_string(),
                allow_production: true,
            },
            token,
            auth_mode,
        )
    }

    /// Returns the endpoint URL this session targets.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the auth token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the auth mode.
    #[must_use]
    pub const fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Returns `true` if this session targets the production endpoint.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.api_url == PROD_URL
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};
