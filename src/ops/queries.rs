//! GraphQL documents used by the reconciler.
//!
//! Each document requests exactly the fields its call site decodes.

/// Full account lookup used for diffing.
pub const ACCOUNT_QUERY: &str = "\
query Account($slug: String!) {
  account(slug: $slug) {
    __typename
    id
    slug
    name
    type
    isHost
    ... on Account { description longDescription tags website }
    ... on AccountWithHost { host { slug name } }
    ... on Account { socialLinks { type url } }
    stats { balance { currency } }
  }
}";

/// Minimal host lookup for the apply-to-host precondition.
pub const HOST_QUERY: &str = "\
query Host($slug: String!) {
  account(slug: $slug) {
    __typename
    id
    slug
    name
    type
    isHost
  }
}";

/// Identity lookup used by the `whoami` command.
pub const WHOAMI_QUERY: &str = "\
query Account($slug: String!) {
  account(slug: $slug) {
    id
    slug
    name
    type
  }
}";

/// Creates a host organization.
pub const CREATE_ORGANIZATION: &str = "\
mutation CreateOrganization($input: OrganizationCreateInput!) {
  createOrganization(organization: $input) {
    id
    slug
    name
    type
  }
}";

/// Creates a collective.
pub const CREATE_COLLECTIVE: &str = "\
mutation CreateCollective($input: CollectiveCreateInput!) {
  createCollective(collective: $input) {
    id
    slug
    name
    type
    ... on AccountWithHost { host { slug name } }
  }
}";

/// Creates a project under a parent collective.
pub const CREATE_PROJECT: &str = "\
mutation CreateProject($project: ProjectCreateInput!, $parent: AccountReferenceInput!) {
  createProject(project: $project, parent: $parent) {
    id
    slug
    name
    type
    ... on AccountWithParent { parent { slug } }
  }
}";

/// Updates the full comparable field set of an account.
pub const EDIT_ACCOUNT: &str = "\
mutation EditAccount($account: AccountUpdateInput!) {
  editAccount(account: $account) {
    id
    slug
    name
    description
    longDescription
    tags
    website
    socialLinks { type url }
    ... on AccountWithHost { host { slug name } }
  }
}";

/// Applies a collective to a fiscal host.
pub const APPLY_TO_HOST: &str = "\
mutation ApplyToHost($collective: AccountReferenceInput!, $host: AccountReferenceInput!, $message: String) {
  applyToHost(collective: $collective, host: $host, message: $message) {
    id
    slug
    ... on AccountWithHost { host { slug name } }
  }
}";
