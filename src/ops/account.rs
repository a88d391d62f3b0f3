//! Typed account snapshots fetched from the API.
//!
//! Each GraphQL call site declares the narrow shape it expects; the shared
//! [`Account`] struct covers the superset of fields the reconciler reads.
//! Snapshots are transient: fetched per call, never cached across calls.

use serde::{Deserialize, Serialize};

/// The social link type carrying an account's website.
pub const WEBSITE_LINK_TYPE: &str = "WEBSITE";

/// A typed social link on an account.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SocialLink {
    /// Link type, e.g. `WEBSITE`, `TWITTER`.
    #[serde(rename = "type")]
    pub link_type: String,
    /// The link URL.
    pub url: String,
}

/// A nested reference to a fiscal host.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct HostRef {
    /// Host account slug.
    pub slug: String,
    /// Host display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A nested reference to a parent account.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ParentRef {
    /// Parent account slug.
    pub slug: String,
}

/// Account statistics; only the balance currency is read.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccountStats {
    /// Balance summary.
    #[serde(default)]
    pub balance: Option<Balance>,
}

/// Balance summary carrying the account currency.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Balance {
    /// ISO currency code.
    #[serde(default)]
    pub currency: Option<String>,
}

/// A remote account snapshot.
///
/// Identified solely by `slug`, which is globally unique in the remote
/// system and never mutated once the account exists. Create-mutation
/// responses populate only a subset of fields; everything else defaults.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque remote identifier.
    #[serde(default)]
    pub id: String,
    /// Human-readable unique identifier.
    #[serde(default)]
    pub slug: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Discriminator: `ORGANIZATION`, `COLLECTIVE`, `PROJECT`, ...
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    /// Whether this account is an active fiscal host.
    #[serde(default)]
    pub is_host: bool,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Long-form description.
    #[serde(default)]
    pub long_description: Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Explicit website field.
    #[serde(default)]
    pub website: Option<String>,
    /// Typed social links.
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    /// The fiscal host this account is attached to, if any.
    #[serde(default)]
    pub host: Option<HostRef>,
    /// The parent account, for projects.
    #[serde(default)]
    pub parent: Option<ParentRef>,
    /// Statistics, read for the balance currency.
    #[serde(default)]
    pub stats: Option<AccountStats>,
}

impl Account {
    /// Returns the account's effective website: the explicit `website`
    /// field if present, otherwise the URL of the first WEBSITE social link.
    #[must_use]
    pub fn effective_website(&self) -> Option<&str> {
        if let Some(website) = self.website.as_deref() {
            if !website.is_empty() {
                return Some(website);
            }
        }
        self.social_links
            .iter()
            .find(|link| link.link_type == WEBSITE_LINK_TYPE)
            .map(|link| link.url.as_str())
    }

    /// Returns the balance currency, upper-cased.
    #[must_use]
    pub fn balance_currency(&self) -> Option<String> {
        self.stats
            .as_ref()
            .and_then(|stats| stats.balance.as_ref())
            .and_then(|balance| balance.currency.as_deref())
            .map(str::to_uppercase)
    }

    /// Returns the slug of the attached host, if any.
    #[must_use]
    pub fn host_slug(&self) -> Option<&str> {
        self.host.as_ref().map(|host| host.slug.as_str())
    }
}

/// Merges a desired website into a social-link list by key.
///
/// Any existing WEBSITE entry is removed and a single new one appended, so
/// at most one WEBSITE link exists after the merge. With no desired
/// website, the list is returned unchanged.
#[must_use]
pub fn merge_website_link(links: &[SocialLink], website: Option<&str>) -> Vec<SocialLink> {
    let Some(url) = website else {
        return links.to_vec();
    };
    let mut merged: Vec<SocialLink> = links
        .iter()
        .filter(|link| link.link_type != WEBSITE_LINK_TYPE)
        .cloned()
        .collect();
    merged.push(SocialLink {
        link_type: WEBSITE_LINK_TYPE.to_string(),
        url: url.to_string(),
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(link_type: &str, url: &str) -> SocialLink {
        SocialLink {
            link_type: link_type.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_effective_website_prefers_explicit_field() {
        let account = Account {
            website: Some("https://explicit.example".to_string()),
            social_links: vec![link(WEBSITE_LINK_TYPE, "https://social.example")],
            ..Account::default()
        };
        assert_eq!(account.effective_website(), Some("https://explicit.example"));
    }

    #[test]
    fn test_effective_website_falls_back_to_website_link() {
        let account = Account {
            social_links: vec![
                link("TWITTER", "https://twitter.example"),
                link(WEBSITE_LINK_TYPE, "https://social.example"),
            ],
            ..Account::default()
        };
        assert_eq!(account.effective_website(), Some("https://social.example"));
    }

    #[test]
    fn test_effective_website_none_when_absent() {
        let account = Account::default();
        assert_eq!(account.effective_website(), None);
    }

    #[test]
    fn test_merge_replaces_existing_website_link() {
        let links = vec![
            link("TWITTER", "https://twitter.example"),
            link(WEBSITE_LINK_TYPE, "https://old.example"),
        ];
        let merged = merge_website_link(&links, Some("https://new.example"));
        let websites: Vec<&SocialLink> = merged
            .iter()
            .filter(|l| l.link_type == WEBSITE_LINK_TYPE)
            .collect();
        assert_eq!(websites.len(), 1);
        assert_eq!(websites[0].url, "https://new.example");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_without_desired_website_is_identity() {
        let links = vec![link(WEBSITE_LINK_TYPE, "https://old.example")];
        assert_eq!(merge_website_link(&links, None), links);
    }

    #[test]
    fn test_balance_currency_is_uppercased() {
        let account = Account {
            stats: Some(AccountStats {
                balance: Some(Balance {
                    currency: Some("nzd".to_string()),
                }),
            }),
            ..Account::default()
        };
        assert_eq!(account.balance_currency(), Some("NZD".to_string()));
    }

    #[test]
    fn test_account_deserializes_from_camel_case() {
        let account: Account = serde_json::from_str(
            r#"{
                "id": "acct1",
                "slug": "opsdevnz",
                "name": "OpsDev",
                "type": "COLLECTIVE",
                "isHost": false,
                "longDescription": "long",
                "socialLinks": [{"type": "WEBSITE", "url": "https://opsdev.example"}],
                "host": {"slug": "host1", "name": "Host"}
            }"#,
        )
        .unwrap();
        assert_eq!(account.slug, "opsdevnz");
        assert_eq!(account.long_description.as_deref(), Some("long"));
        assert_eq!(account.host_slug(), Some("host1"));
        assert_eq!(account.effective_website(), Some("https://opsdev.example"));
    }
}
