//! # Open Collective ops automation client
//!
//! A thin, staging-first automation client for the Open Collective GraphQL
//! v2 API. It resolves an API token, issues queries and mutations against
//! the staging or production endpoint, and performs idempotent upserts for
//! three entity kinds (fiscal hosts, collectives, and projects) driven by
//! declarative list-of-records input files.
//!
//! ## Overview
//!
//! - [`Session`]: fixed endpoint + token + auth mode, with a production
//!   guard enforced at construction
//! - [`OcClient`]: one HTTP POST per GraphQL operation, bounded timeout and
//!   retries, token redaction in every error path
//! - [`ops`]: the upsert engine; diff desired vs. live state, create if
//!   absent, patch if different, with per-kind rules (currency advisory,
//!   apply-to-host, parent precondition)
//! - [`batch`]: load YAML/JSON record files and reconcile them in order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use opencollective_ops::{AuthMode, HostRecord, OcClient, OcConfig, Session};
//! use opencollective_ops::ops::upsert_host;
//!
//! let session = Session::for_staging(token, AuthMode::PersonalToken)?;
//! let client = OcClient::new(session, OcConfig::default());
//!
//! let record: HostRecord = serde_yaml::from_str(
//!     "slug: startmeupnz\nname: StartMeUp.NZ\ncurrency: NZD\n",
//! )?;
//! let result = upsert_host(&client, &record).await?;
//! println!("created={} updated={}", result.created, result.updated);
//! ```
//!
//! ## Safety Rails
//!
//! Staging is always the default target. Using the production endpoint
//! requires an explicit opt-in (an explicit URL or the production flag);
//! otherwise session construction fails with
//! [`ConfigError::ProductionNotAllowed`]. Every error message passing
//! through logs or user-facing output has the active token redacted, and
//! 401/403 response bodies are withheld entirely outside debug mode.
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: guards and preconditions run before any write
//! - **Idempotent by design**: reruns against matching live state are no-ops
//! - **Sequential**: one network call in flight, records processed in file order

pub mod auth;
pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod ops;

// Re-export public types at crate root for convenience
pub use auth::{resolve_token, resolve_token_with, AuthMode, Session, TokenSource};
pub use client::{ClientError, OcClient, REDACTION_MARKER};
pub use config::{resolve_endpoint, Endpoint, OcConfig, OcConfigBuilder, PROD_URL, STAGING_URL};
pub use error::ConfigError;
pub use ops::{
    upsert_collective, upsert_host, upsert_project, Account, CollectiveRecord, HostRecord,
    OpsError, ProjectRecord, UpsertResult,
};
