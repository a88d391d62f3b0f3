//! The upsert engine: diff desired state against the live account and
//! decide create / update / side-effect calls.
//!
//! All three entity kinds run through one driver ([`run`]) parameterized by
//! a [`Plan`] variant carrying the kind-specific create mutation,
//! precondition, and post-update hook. The field-diff and full-field patch
//! logic is shared.
//!
//! State machine per record: lookup → (create) → diff → (update) →
//! (post hook). `created` and `updated` are independent outcomes; a
//! create response whose fields differ from the desired state triggers an
//! immediate update in the same run.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{ClientError, OcClient};
use crate::ops::account::{merge_website_link, Account};
use crate::ops::errors::OpsError;
use crate::ops::queries;
use crate::ops::records::{CollectiveRecord, HostRecord, ProjectRecord, UpsertResult};

/// Structured error code the API attaches to missing-entity failures.
const NOT_FOUND_CODE: &str = "NOT_FOUND";

/// Known not-found message phrasings, one per entity kind.
///
/// Substring matching is brittle coupling to remote wording; it is kept
/// only as a fallback for servers that omit `extensions.code`, isolated
/// here and pinned by the tests below.
const NOT_FOUND_PHRASES: &[&str] = &[
    "No collective found with slug",
    "No account found with slug",
    "No organization found with slug",
];

/// Classifies a client error as "entity absent" rather than "call failed".
///
/// Prefers the structured `extensions.code`; falls back to message
/// substrings when no code is present.
fn is_not_found(error: &ClientError) -> bool {
    if let Some(code) = error.graphql_code() {
        return code == NOT_FOUND_CODE;
    }
    match error {
        ClientError::Graphql { message, .. } => NOT_FOUND_PHRASES
            .iter()
            .any(|phrase| message.contains(phrase)),
        _ => false,
    }
}

// Per-operation result shapes. Each call site decodes exactly the narrow
// shape its mutation returns; mismatches fail as typed decode errors.

#[derive(Debug, Deserialize)]
struct AccountData {
    #[serde(default)]
    account: Option<Account>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrganizationData {
    create_organization: Account,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCollectiveData {
    create_collective: Account,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectData {
    create_project: Account,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditAccountData {
    edit_account: Account,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyToHostData {
    apply_to_host: Account,
}

/// The comparable field set, normalized from a desired record.
struct Desired<'a> {
    slug: &'a str,
    name: &'a str,
    /// Absent description compares as empty.
    description: &'a str,
    /// Compared (and patched) only when supplied.
    long_description: Option<&'a str>,
    website: Option<&'a str>,
    tags: &'a [String],
    /// Hosts compare the derived website; collectives and projects do not.
    compare_website: bool,
}

/// Returns `true` if any comparable field differs between live and desired.
fn needs_update(account: &Account, desired: &Desired<'_>) -> bool {
    if account.name != desired.name {
        return true;
    }
    if account.description.as_deref().unwrap_or("") != desired.description {
        return true;
    }
    if let Some(long) = desired.long_description {
        if account.long_description.as_deref().unwrap_or("") != long {
            return true;
        }
    }
    let live_tags: &[String] = account.tags.as_deref().unwrap_or(&[]);
    if live_tags != desired.tags {
        return true;
    }
    if desired.compare_website && account.effective_website() != desired.website {
        return true;
    }
    false
}

/// Builds the update patch.
///
/// The remote update replaces the full field set it accepts, so the patch
/// always resends every comparable field, not only the differing ones.
fn build_patch(account: &Account, desired: &Desired<'_>) -> Value {
    let mut patch = json!({
        "id": account.id,
        "name": desired.name,
        "description": desired.description,
        "tags": desired.tags,
    });
    if desired.compare_website {
        let links: Vec<Value> = merge_website_link(&account.social_links, desired.website)
            .iter()
            .map(|link| json!({ "type": link.link_type, "url": link.url }))
            .collect();
        patch["socialLinks"] = Value::Array(links);
    }
    if let Some(long) = desired.long_description {
        patch["longDescription"] = json!(long);
    }
    patch
}

/// Looks up an account by slug, mapping not-found failures to `None`.
async fn fetch_account(client: &OcClient, slug: &str) -> Result<Option<Account>, ClientError> {
    let result = client
        .query::<AccountData>(queries::ACCOUNT_QUERY, Some(json!({ "slug": slug })))
        .await;
    match result {
        Ok(data) => Ok(data.account),
        Err(error) if is_not_found(&error) => Ok(None),
        Err(error) => Err(error),
    }
}

/// Verifies that `slug` names an existing, active fiscal host.
async fn verify_host(client: &OcClient, slug: &str) -> Result<(), OpsError> {
    let result = client
        .query::<AccountData>(queries::HOST_QUERY, Some(json!({ "slug": slug })))
        .await;
    let host = match result {
        Ok(data) => data.account,
        Err(error) if is_not_found(&error) => None,
        Err(error) => return Err(error.into()),
    };
    let Some(host) = host else {
        return Err(OpsError::HostNotFound {
            slug: slug.to_string(),
        });
    };
    if !host.is_host {
        return Err(OpsError::NotAHost {
            slug: slug.to_string(),
        });
    }
    Ok(())
}

/// Runs the shared diff/update pass, returning the final snapshot and
/// whether an update call was issued.
async fn diff_and_patch(
    client: &OcClient,
    account: Account,
    desired: &Desired<'_>,
) -> Result<(Account, bool), ClientError> {
    if !needs_update(&account, desired) {
        return Ok((account, false));
    }
    let patch = build_patch(&account, desired);
    tracing::debug!(slug = desired.slug, "updating account");
    let data: EditAccountData = client
        .query(queries::EDIT_ACCOUNT, Some(json!({ "account": patch })))
        .await?;
    Ok((data.edit_account, true))
}

/// Variant descriptor: one entity kind per arm, shared engine around it.
enum Plan<'a> {
    Host(&'a HostRecord),
    Collective(&'a CollectiveRecord),
    Project(&'a ProjectRecord),
}

impl<'a> Plan<'a> {
    fn desired(&self) -> Desired<'a> {
        match self {
            Self::Host(record) => Desired {
                slug: &record.slug,
                name: &record.name,
                description: record.description.as_deref().unwrap_or(""),
                long_description: record.long_description.as_deref(),
                website: record.website.as_deref(),
                tags: &record.tags,
                compare_website: true,
            },
            Self::Collective(record) => Desired {
                slug: &record.slug,
                name: &record.name,
                description: record.description.as_deref().unwrap_or(""),
                long_description: None,
                website: None,
                tags: &record.tags,
                compare_website: false,
            },
            Self::Project(record) => Desired {
                slug: &record.slug,
                name: &record.name,
                description: record.description.as_deref().unwrap_or(""),
                long_description: None,
                website: None,
                tags: &record.tags,
                compare_website: false,
            },
        }
    }

    /// Fatal checks that run before any mutating call, so a failure never
    /// leaves partial work behind.
    async fn check_preconditions(&self, client: &OcClient) -> Result<(), OpsError> {
        match self {
            Self::Collective(record) if record.wants_host_application() => {
                // wants_host_application() implies the slug is present
                let host_slug = record.host_slug.as_deref().unwrap_or_default();
                verify_host(client, host_slug).await
            }
            Self::Project(record) => {
                if fetch_account(client, &record.parent_slug).await?.is_none() {
                    return Err(OpsError::ParentNotFound {
                        slug: record.parent_slug.clone(),
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Issues the kind-specific create mutation.
    async fn create(&self, client: &OcClient) -> Result<Account, ClientError> {
        match self {
            Self::Host(record) => {
                let input = json!({
                    "name": record.name,
                    "slug": record.slug,
                    "description": record.description.as_deref().unwrap_or(""),
                    "website": record.website,
                });
                let data: CreateOrganizationData = client
                    .query(queries::CREATE_ORGANIZATION, Some(json!({ "input": input })))
                    .await?;
                Ok(data.create_organization)
            }
            Self::Collective(record) => {
                let input = json!({
                    "name": record.name,
                    "slug": record.slug,
                    "description": record.description.as_deref().unwrap_or(""),
                    "tags": record.tags,
                    "settings": { "features": { "expenses": true } },
                });
                let data: CreateCollectiveData = client
                    .query(queries::CREATE_COLLECTIVE, Some(json!({ "input": input })))
                    .await?;
                Ok(data.create_collective)
            }
            Self::Project(record) => {
                let project = json!({
                    "name": record.name,
                    "slug": record.slug,
                    "description": record.description.as_deref().unwrap_or(""),
                    "tags": record.tags,
                });
                let variables = json!({
                    "project": project,
                    "parent": { "slug": record.parent_slug },
                });
                let data: CreateProjectData = client
                    .query(queries::CREATE_PROJECT, Some(variables))
                    .await?;
                Ok(data.create_project)
            }
        }
    }
}

/// The shared driver: precondition → lookup → create → diff/update → hook.
async fn run(client: &OcClient, plan: Plan<'_>) -> Result<UpsertResult, OpsError> {
    plan.check_preconditions(client).await?;

    let desired = plan.desired();
    let mut created = false;
    let account = match fetch_account(client, desired.slug).await? {
        Some(account) => account,
        None => {
            tracing::info!(slug = desired.slug, "creating account");
            created = true;
            plan.create(client).await?
        }
    };

    let (mut account, updated) = diff_and_patch(client, account, &desired).await?;

    let mut warnings = Vec::new();
    let mut applied_to_host = false;
    match &plan {
        Plan::Host(record) => {
            // Currency cannot be changed through editAccount; a mismatch
            // needs manual action, so it warns instead of failing.
            if let Some(desired_currency) = record.currency.as_deref().map(str::to_uppercase) {
                let current = account.balance_currency();
                if current.as_deref() != Some(desired_currency.as_str()) {
                    warnings.push(format!(
                        "Currency mismatch: account has {}, desired {desired_currency}. Update Settings » Info before activating as host.",
                        current.as_deref().unwrap_or("unset"),
                    ));
                }
            }
        }
        Plan::Collective(record) if record.wants_host_application() => {
            let host_slug = record.host_slug.as_deref().unwrap_or_default();
            if account.host_slug() == Some(host_slug) {
                tracing::debug!(slug = desired.slug, host = host_slug, "already attached to host");
            } else {
                let message = record.host_apply_message.clone().unwrap_or_else(|| {
                    format!("Please host {} (test/staging).", record.name)
                });
                tracing::info!(slug = desired.slug, host = host_slug, "applying to host");
                let data: ApplyToHostData = client
                    .query(
                        queries::APPLY_TO_HOST,
                        Some(json!({
                            "collective": { "id": account.id },
                            "host": { "slug": host_slug },
                            "message": message,
                        })),
                    )
                    .await?;
                account.host = data.apply_to_host.host;
                applied_to_host = true;
            }
        }
        _ => {}
    }

    Ok(UpsertResult {
        slug: desired.slug.to_string(),
        created,
        updated,
        applied_to_host,
        warnings,
        account,
    })
}

/// Creates or updates a fiscal host organization.
///
/// # Errors
///
/// Returns [`OpsError::Client`] for transport and remote failures. A
/// currency mismatch is reported as a warning, never an error.
pub async fn upsert_host(client: &OcClient, record: &HostRecord) -> Result<UpsertResult, OpsError> {
    run(client, Plan::Host(record)).await
}

/// Creates or updates a collective, optionally applying it to a host.
///
/// When the record requests a host application, the host is verified
/// before any write; the application call is skipped when the collective
/// is already attached to the desired host.
///
/// # Errors
///
/// Returns [`OpsError::HostNotFound`] / [`OpsError::NotAHost`] when the
/// host precondition fails, [`OpsError::Client`] otherwise.
pub async fn upsert_collective(
    client: &OcClient,
    record: &CollectiveRecord,
) -> Result<UpsertResult, OpsError> {
    run(client, Plan::Collective(record)).await
}

/// Creates or updates a project under its parent collective.
///
/// # Errors
///
/// Returns [`OpsError::ParentNotFound`] when the parent does not resolve,
/// before any create call is issued; [`OpsError::Client`] otherwise.
pub async fn upsert_project(
    client: &OcClient,
    record: &ProjectRecord,
) -> Result<UpsertResult, OpsError> {
    run(client, Plan::Project(record)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{GraphqlErrorEntry, GraphqlErrorExtensions};
    use crate::ops::account::SocialLink;

    fn graphql_error(message: &str, code: Option<&str>) -> ClientError {
        ClientError::Graphql {
            message: message.to_string(),
            errors: vec![GraphqlErrorEntry {
                message: message.to_string(),
                extensions: code.map(|code| GraphqlErrorExtensions {
                    code: Some(code.to_string()),
                }),
            }],
        }
    }

    #[test]
    fn test_not_found_by_structured_code() {
        let error = graphql_error("whatever the server says", Some("NOT_FOUND"));
        assert!(is_not_found(&error));
    }

    #[test]
    fn test_other_structured_code_is_not_not_found() {
        let error = graphql_error("No account found with slug x", Some("FORBIDDEN"));
        assert!(!is_not_found(&error));
    }

    // Fallback phrasing pinned to the wording the API uses today.
    #[test]
    fn test_not_found_by_message_fallback() {
        for message in [
            "No collective found with slug opsdevnz",
            "No account found with slug opsdevnz",
            "No organization found with slug opsdevnz",
        ] {
            assert!(is_not_found(&graphql_error(message, None)), "{message}");
        }
    }

    #[test]
    fn test_unrelated_graphql_error_is_not_not_found() {
        let error = graphql_error("You need to be logged in", None);
        assert!(!is_not_found(&error));
    }

    #[test]
    fn test_request_error_is_never_not_found() {
        let error = ClientError::Request {
            code: 404,
            message: "No account found with slug x".to_string(),
        };
        assert!(!is_not_found(&error));
    }

    fn desired<'a>(name: &'a str, description: &'a str, tags: &'a [String]) -> Desired<'a> {
        Desired {
            slug: "s",
            name,
            description,
            long_description: None,
            website: None,
            tags,
            compare_website: false,
        }
    }

    #[test]
    fn test_no_update_when_fields_match() {
        let tags = vec!["ops".to_string()];
        let account = Account {
            name: "N".to_string(),
            description: Some("d".to_string()),
            tags: Some(tags.clone()),
            ..Account::default()
        };
        assert!(!needs_update(&account, &desired("N", "d", &tags)));
    }

    #[test]
    fn test_absent_live_description_compares_as_empty() {
        let tags: Vec<String> = Vec::new();
        let account = Account {
            name: "N".to_string(),
            ..Account::default()
        };
        assert!(!needs_update(&account, &desired("N", "", &tags)));
        assert!(needs_update(&account, &desired("N", "now set", &tags)));
    }

    #[test]
    fn test_tag_order_matters() {
        let account = Account {
            name: "N".to_string(),
            tags: Some(vec!["a".to_string(), "b".to_string()]),
            ..Account::default()
        };
        let reversed = vec!["b".to_string(), "a".to_string()];
        assert!(needs_update(&account, &desired("N", "", &reversed)));
    }

    #[test]
    fn test_omitted_long_description_never_forces_update() {
        let tags: Vec<String> = Vec::new();
        let account = Account {
            name: "N".to_string(),
            long_description: Some("existing".to_string()),
            ..Account::default()
        };
        assert!(!needs_update(&account, &desired("N", "", &tags)));
    }

    #[test]
    fn test_supplied_long_description_is_compared() {
        let tags: Vec<String> = Vec::new();
        let account = Account {
            name: "N".to_string(),
            long_description: Some("old".to_string()),
            ..Account::default()
        };
        let mut d = desired("N", "", &tags);
        d.long_description = Some("new");
        assert!(needs_update(&account, &d));
        d.long_description = Some("old");
        assert!(!needs_update(&account, &d));
    }

    #[test]
    fn test_website_compared_only_when_enabled() {
        let tags: Vec<String> = Vec::new();
        let account = Account {
            name: "N".to_string(),
            website: Some("https://live.example".to_string()),
            ..Account::default()
        };
        let mut d = desired("N", "", &tags);
        d.website = Some("https://new.example");
        assert!(!needs_update(&account, &d));
        d.compare_website = true;
        assert!(needs_update(&account, &d));
    }

    #[test]
    fn test_patch_resends_full_field_set() {
        let tags = vec!["ops".to_string()];
        let account = Account {
            id: "acct1".to_string(),
            name: "Old".to_string(),
            social_links: vec![SocialLink {
                link_type: "TWITTER".to_string(),
                url: "https://twitter.example".to_string(),
            }],
            ..Account::default()
        };
        let mut d = desired("New", "desc", &tags);
        d.compare_website = true;
        d.website = Some("https://site.example");
        d.long_description = Some("long");

        let patch = build_patch(&account, &d);
        assert_eq!(patch["id"], "acct1");
        assert_eq!(patch["name"], "New");
        assert_eq!(patch["description"], "desc");
        assert_eq!(patch["tags"][0], "ops");
        assert_eq!(patch["longDescription"], "long");
        // merged links keep the non-WEBSITE entry and add exactly one WEBSITE
        let links = patch["socialLinks"].as_array().unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[1]["type"], "WEBSITE");
        assert_eq!(links[1]["url"], "https://site.example");
    }

    #[test]
    fn test_collective_patch_omits_social_links() {
        let tags: Vec<String> = Vec::new();
        let account = Account {
            id: "acct1".to_string(),
            ..Account::default()
        };
        let patch = build_patch(&account, &desired("N", "", &tags));
        assert!(patch.get("socialLinks").is_none());
        assert!(patch.get("longDescription").is_none());
    }
}
