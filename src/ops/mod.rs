//! Upsert reconciliation for hosts, collectives, and projects.

mod account;
mod errors;
pub mod queries;
mod records;
mod upsert;

pub use account::{
    merge_website_link, Account, AccountStats, Balance, HostRef, ParentRef, SocialLink,
    WEBSITE_LINK_TYPE,
};
pub use errors::OpsError;
pub use records::{CollectiveRecord, HostRecord, ProjectRecord, UpsertResult};
pub use upsert::{upsert_collective, upsert_host, upsert_project};
