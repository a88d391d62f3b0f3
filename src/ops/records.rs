//! Desired-state records and upsert results.
//!
//! Records come from operator-maintained YAML/JSON files and accept both
//! snake_case and camelCase keys. Tags accept a single scalar or a
//! sequence and always normalize to an ordered list.

use serde::{Deserialize, Deserializer, Serialize};

use crate::ops::account::Account;

/// Deserializes tags from a scalar, a sequence, or nothing.
fn de_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagsInput {
        One(String),
        Many(Vec<String>),
    }

    match Option::<TagsInput>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(TagsInput::One(tag)) => Ok(vec![tag]),
        Some(TagsInput::Many(tags)) => Ok(tags),
    }
}

/// Desired state for a fiscal host organization.
#[derive(Clone, Debug, Deserialize)]
pub struct HostRecord {
    /// Unique slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Short description; absent compares as empty.
    #[serde(default)]
    pub description: Option<String>,
    /// Long description; compared only when supplied.
    #[serde(default, alias = "longDescription")]
    pub long_description: Option<String>,
    /// Website URL, merged into social links as the WEBSITE entry.
    #[serde(default)]
    pub website: Option<String>,
    /// Ordered tags.
    #[serde(default, deserialize_with = "de_tags")]
    pub tags: Vec<String>,
    /// Expected balance currency; mismatches warn, never fail.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Desired state for a collective.
#[derive(Clone, Debug, Deserialize)]
pub struct CollectiveRecord {
    /// Unique slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Short description; absent compares as empty.
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered tags.
    #[serde(default, deserialize_with = "de_tags")]
    pub tags: Vec<String>,
    /// Slug of the fiscal host to apply to.
    #[serde(default, alias = "hostSlug")]
    pub host_slug: Option<String>,
    /// Whether to apply to the host after the upsert.
    #[serde(default, alias = "applyToHost")]
    pub apply_to_host: bool,
    /// Application message; defaults to a template using the name.
    #[serde(default, alias = "hostApplyMessage")]
    pub host_apply_message: Option<String>,
}

impl CollectiveRecord {
    /// Returns `true` when a host application is requested and a host slug
    /// is present.
    #[must_use]
    pub const fn wants_host_application(&self) -> bool {
        self.apply_to_host && self.host_slug.is_some()
    }
}

/// Desired state for a project under a parent collective.
#[derive(Clone, Debug, Deserialize)]
pub struct ProjectRecord {
    /// Unique slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Slug of the owning collective. Required; the parent must exist.
    #[serde(alias = "parentSlug")]
    pub parent_slug: String,
    /// Short description; absent compares as empty.
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered tags.
    #[serde(default, deserialize_with = "de_tags")]
    pub tags: Vec<String>,
}

/// Outcome of one reconciliation.
///
/// `created` and `updated` are independent: a freshly created account still
/// goes through the diff pass and may be updated in the same run when the
/// create response's fields differ from the desired state.
#[derive(Clone, Debug, Serialize)]
pub struct UpsertResult {
    /// The record's slug.
    pub slug: String,
    /// Whether a create mutation was issued.
    pub created: bool,
    /// Whether an update mutation was issued.
    pub updated: bool,
    /// Whether a host application was submitted.
    pub applied_to_host: bool,
    /// Non-fatal advisories (e.g. currency mismatch).
    pub warnings: Vec<String>,
    /// Final account snapshot.
    pub account: Account,
}
