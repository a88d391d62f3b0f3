//! Batch driver: load desired-state records from a file and reconcile
//! them in order.
//!
//! Input files are YAML (`.yaml` / `.yml`) or JSON with a top-level list
//! of records. Processing is strictly sequential in file order; the first
//! unrecovered error aborts the run. No partial-completion checkpoint is
//! kept; reruns are idempotent because create/update calls are no-ops
//! once live state matches desired state.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::client::OcClient;
use crate::error::ConfigError;
use crate::ops::{
    upsert_collective, upsert_host, upsert_project, CollectiveRecord, HostRecord, OpsError,
    ProjectRecord, UpsertResult,
};

/// Loads an ordered list of records from a YAML or JSON file.
///
/// # Errors
///
/// Returns [`ConfigError::BatchFileUnreadable`] on I/O failure,
/// [`ConfigError::BatchFileInvalid`] on parse failure, and
/// [`ConfigError::BatchFileNotAList`] when the top-level value is not a
/// list.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ConfigError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::BatchFileUnreadable {
        path: display.clone(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "yaml" | "yml"));

    // Parse to a generic value first so a non-list top level is reported
    // as a format error, not a per-record type error.
    let value: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&text).map_err(|err| ConfigError::BatchFileInvalid {
            path: display.clone(),
            format: "YAML",
            reason: err.to_string(),
        })?
    } else {
        serde_json::from_str(&text).map_err(|err| ConfigError::BatchFileInvalid {
            path: display.clone(),
            format: "JSON",
            reason: err.to_string(),
        })?
    };

    if !value.is_array() {
        return Err(ConfigError::BatchFileNotAList { path: display });
    }

    serde_json::from_value(value).map_err(|err| ConfigError::BatchFileInvalid {
        path: display,
        format: if is_yaml { "YAML" } else { "JSON" },
        reason: err.to_string(),
    })
}

fn selected(slug: &str, only: Option<&str>) -> bool {
    only.map_or(true, |wanted| wanted == slug)
}

/// Reconciles host records in order, optionally restricted to one slug.
///
/// # Errors
///
/// Aborts at the first record that fails, returning its [`OpsError`].
pub async fn run_hosts(
    client: &OcClient,
    records: &[HostRecord],
    only: Option<&str>,
) -> Result<Vec<UpsertResult>, OpsError> {
    let mut results = Vec::new();
    for record in records {
        if !selected(&record.slug, only) {
            continue;
        }
        tracing::info!(slug = %record.slug, "reconciling host");
        results.push(upsert_host(client, record).await?);
    }
    Ok(results)
}

/// Reconciles collective records in order, optionally restricted to one slug.
///
/// # Errors
///
/// Aborts at the first record that fails, returning its [`OpsError`].
pub async fn run_collectives(
    client: &OcClient,
    records: &[CollectiveRecord],
    only: Option<&str>,
) -> Result<Vec<UpsertResult>, OpsError> {
    let mut results = Vec::new();
    for record in records {
        if !selected(&record.slug, only) {
            continue;
        }
        tracing::info!(slug = %record.slug, "reconciling collective");
        results.push(upsert_collective(client, record).await?);
    }
    Ok(results)
}

/// Reconciles project records in order, optionally restricted to one slug.
///
/// # Errors
///
/// Aborts at the first record that fails, returning its [`OpsError`].
pub async fn run_projects(
    client: &OcClient,
    records: &[ProjectRecord],
    only: Option<&str>,
) -> Result<Vec<UpsertResult>, OpsError> {
    let mut results = Vec::new();
    for record in records {
        if !selected(&record.slug, only) {
            continue;
        }
        tracing::info!(slug = %record.slug, "reconciling project");
        results.push(upsert_project(client, record).await?);
    }
    Ok(results)
}
