//! Configuration types for the automation client.
//!
//! The main types in this module are:
//!
//! - [`OcConfig`]: per-invocation client settings (identity, timeout, retries, debug)
//! - [`OcConfigBuilder`]: a builder for constructing [`OcConfig`] instances
//! - [`Endpoint`] and [`resolve_endpoint`]: staging/production endpoint selection
//!
//! # Example
//!
//! ```rust
//! use opencollective_ops::OcConfig;
//! use std::time::Duration;
//!
//! let config = OcConfig::builder()
//!     .app_name("oc-ops-nightly")
//!     .timeout(Duration::from_secs(30))
//!     .retries(3)
//!     .build();
//!
//! assert_eq!(config.retries(), 3);
//! ```

mod endpoint;

pub use endpoint::{resolve_endpoint, Endpoint, PROD_URL, STAGING_URL};

use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default number of additional retry attempts after the first try.
pub const DEFAULT_RETRIES: u32 = 2;

/// Environment variable that enables verbose debug output.
pub const DEBUG_ENV_VAR: &str = "OC_DEBUG";

/// Client configuration.
///
/// Holds everything about *how* requests are made; *where* they go and
/// *as whom* lives in [`Session`](crate::Session).
///
/// # Thread Safety
///
/// `OcConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct OcConfig {
    app_name: String,
    timeout: Duration,
    retries: u32,
    debug: bool,
}

impl OcConfig {
    /// Creates a new builder for constructing an `OcConfig`.
    #[must_use]
    pub fn builder() -> OcConfigBuilder {
        OcConfigBuilder::new()
    }

    /// Returns the application name sent in the `User-Agent` header.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the number of additional retry attempts.
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns whether verbose debug output is enabled.
    ///
    /// In debug mode, redacted error bodies are included for 401/403
    /// responses and a token fingerprint is appended to HTTP errors.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}

impl Default for OcConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`OcConfig`].
#[derive(Debug, Default)]
pub struct OcConfigBuilder {
    app_name: Option<String>,
    timeout: Option<Duration>,
    retries: Option<u32>,
    debug: Option<bool>,
}

impl OcConfigBuilder {
    /// Creates a new builder with no fields set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application name used to identify this client.
    #[must_use]
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the number of additional retry attempts for retryable failures.
    #[must_use]
    pub const fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Enables or disables verbose debug output.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Builds the configuration, filling unset fields with defaults.
    ///
    /// The debug flag defaults to the value of the `OC_DEBUG` environment
    /// variable (`1`, `true`, or `yes`, case-insensitive).
    #[must_use]
    pub fn build(self) -> OcConfig {
        OcConfig {
            app_name: self
                .app_name
                .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retries: self.retries.unwrap_or(DEFAULT_RETRIES),
            debug: self.debug.unwrap_or_else(debug_from_env),
        }
    }
}

fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV_VAR)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

// Verify OcConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OcConfig>();
};
