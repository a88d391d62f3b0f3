//! GraphQL transport for the Open Collective API.
//!
//! This module provides the [`OcClient`] type: one HTTP POST per GraphQL
//! operation, with auth headers built fresh per call, a bounded timeout,
//! and bounded retries for server-side failures.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{AuthMode, Session};
use crate::client::errors::{ClientError, GraphqlErrorEntry};
use crate::client::redact::{redact, token_fingerprint};
use crate::config::OcConfig;

/// Base delay for the linear retry backoff.
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Maximum number of body characters echoed into an error message.
const BODY_SNIPPET_LEN: usize = 400;

/// The shape of a GraphQL HTTP response body.
///
/// A non-empty `errors` array always takes precedence over `data`, even
/// when the server returns partial data alongside errors.
#[derive(Debug, serde::Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

/// GraphQL client bound to one [`Session`].
///
/// The underlying connection pool is owned by the client for its entire
/// lifetime and released on drop, including on error paths.
///
/// # Thread Safety
///
/// `OcClient` is `Send + Sync`, safe to share across async tasks, though
/// batch processing is deliberately sequential.
///
/// # Example
///
/// ```rust,ignore
/// use opencollective_ops::{AuthMode, OcClient, OcConfig, Session};
///
/// let session = Session::for_staging("token".to_string(), AuthMode::PersonalToken)?;
/// let client = OcClient::new(session, OcConfig::default());
///
/// let data = client
///     .execute("query { account(slug: \"opsdevnz\") { id } }", None)
///     .await?;
/// ```
#[derive(Debug)]
pub struct OcClient {
    http: reqwest::Client,
    session: Session,
    config: OcConfig,
}

// Verify OcClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OcClient>();
};

impl OcClient {
    /// Creates a new client for the given session.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This
    /// should only happen in extremely unusual circumstances (e.g. TLS
    /// initialization failure).
    #[must_use]
    pub fn new(session: Session, config: OcConfig) -> Self {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            session,
            config,
        }
    }

    /// Returns the session this client is bound to.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &OcConfig {
        &self.config
    }

    /// Executes a GraphQL operation and returns the `data` payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] after exhausting retries on
    /// network failure, [`ClientError::Request`] for non-2xx statuses
    /// (5xx after exhausting retries, 4xx immediately), and
    /// [`ClientError::Graphql`] when the response carries a non-empty
    /// `errors` array (never retried).
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<Value, ClientError> {
        self.execute_with_key(query, variables, None).await
    }

    /// Executes a GraphQL operation with an optional idempotency key.
    ///
    /// The key is attached as an `Idempotency-Key` header so mutations can
    /// be replayed safely on the remote side.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn execute_with_key(
        &self,
        query: &str,
        variables: Option<Value>,
        idempotency_key: Option<&str>,
    ) -> Result<Value, ClientError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        });

        let retries = self.config.retries();
        let mut attempt: u32 = 0;
        loop {
            let can_retry = attempt < retries;
            match self.send_once(&body, idempotency_key).await {
                Ok(outcome) => return self.classify(outcome),
                Err(SendFailure::Network(err)) => {
                    if !can_retry {
                        return Err(ClientError::Transport(err));
                    }
                    tracing::debug!(attempt, error = %err, "network failure, retrying");
                }
                Err(SendFailure::Status { code, body_text }) => {
                    if code < 500 || !can_retry {
                        return Err(self.request_error(code, &body_text));
                    }
                    tracing::debug!(attempt, code, "server error, retrying");
                }
            }
            attempt += 1;
            let delay = std::time::Duration::from_millis(RETRY_BASE_DELAY_MS * u64::from(attempt));
            tokio::time::sleep(delay).await;
        }
    }

    /// Executes a GraphQL operation and decodes `data` into `T`.
    ///
    /// Each call site declares the narrow result shape it expects; a shape
    /// mismatch surfaces as [`ClientError::Decode`] instead of an untyped
    /// map leaking into callers.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute), plus [`ClientError::Decode`].
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T, ClientError> {
        let data = self.execute(query, variables).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Sends the request once and splits the outcome into success body,
    /// HTTP status failure, or network failure.
    async fn send_once(
        &self,
        body: &Value,
        idempotency_key: Option<&str>,
    ) -> Result<String, SendFailure> {
        // Headers are constructed fresh per call from session state; no
        // mutable header map is shared across calls.
        let mut request = self
            .http
            .post(self.session.api_url())
            .header("User-Agent", self.user_agent())
            .json(body);
        request = match self.session.auth_mode() {
            AuthMode::PersonalToken => request.header("Personal-Token", self.session.token()),
            AuthMode::Bearer => request.header(
                "Authorization",
                format!("Bearer {}", self.session.token()),
            ),
        };
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await.map_err(SendFailure::Network)?;
        let code = response.status().as_u16();
        let body_text = response.text().await.unwrap_or_default();
        if code >= 400 {
            return Err(SendFailure::Status { code, body_text });
        }
        Ok(body_text)
    }

    /// Classifies a 2xx response body: GraphQL errors take precedence over
    /// any `data` payload.
    fn classify(&self, body_text: String) -> Result<Value, ClientError> {
        let parsed: GraphqlResponse = serde_json::from_str(&body_text)?;
        if let Some(errors) = parsed.errors {
            if !errors.is_empty() {
                let token = self.session.token();
                let errors: Vec<GraphqlErrorEntry> = errors
                    .into_iter()
                    .map(|mut entry| {
                        entry.message = redact(&entry.message, token);
                        entry
                    })
                    .collect();
                let message = errors
                    .first()
                    .map(|entry| entry.message.clone())
                    .unwrap_or_default();
                return Err(ClientError::Graphql { message, errors });
            }
        }
        Ok(parsed.data.unwrap_or(Value::Null))
    }

    /// Builds a redacted [`ClientError::Request`] for a non-2xx response.
    ///
    /// 401/403 bodies are withheld entirely outside debug mode so that
    /// auth-challenge diagnostics never leak. In debug mode a redacted
    /// snippet and a token fingerprint are included for correlation.
    fn request_error(&self, code: u16, body_text: &str) -> ClientError {
        let token = self.session.token();
        let redacted = redact(body_text, token);
        let snippet: String = redacted.chars().take(BODY_SNIPPET_LEN).collect();

        let mut message = format!("HTTP {code} {}.", self.session.api_url());
        if self.config.debug() {
            if snippet.is_empty() {
                message.push_str(" Body: <omitted>");
            } else {
                message.push_str(&format!(" Body: {snippet}"));
            }
            let fingerprint = token_fingerprint(token);
            if !fingerprint.is_empty() {
                message.push_str(&format!(" Token fingerprint: {fingerprint}"));
            }
        } else if matches!(code, 401 | 403) || snippet.is_empty() {
            message.push_str(" Body: <omitted>");
        } else {
            message.push_str(&format!(" Body: {snippet}"));
        }

        ClientError::Request { code, message }
    }

    fn user_agent(&self) -> String {
        format!("{} v{}", self.config.app_name(), env!("CARGO_PKG_VERSION"))
    }
}

/// Internal split of a single attempt's failure modes.
enum SendFailure {
    Network(reqwest::Error),
    Status { code: u16, body_text: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::redact::REDACTION_MARKER;

    fn test_client(debug: bool) -> OcClient {
        let session =
            Session::for_staging("sekrit-token".to_string(), AuthMode::PersonalToken).unwrap();
        OcClient::new(session, OcConfig::builder().debug(debug).build())
    }

    #[test]
    fn test_request_error_redacts_token_from_body() {
        let client = test_client(false);
        let error = client.request_error(500, "failure while using sekrit-token here");
        let message = error.to_string();
        assert!(!message.contains("sekrit-token"));
        assert!(message.contains(REDACTION_MARKER));
    }

    #[test]
    fn test_401_body_is_withheld_without_debug() {
        let client = test_client(false);
        let error = client.request_error(401, "challenge details");
        let message = error.to_string();
        assert!(!message.contains("challenge details"));
        assert!(message.contains("<omitted>"));
    }

    #[test]
    fn test_401_body_is_included_redacted_in_debug_mode() {
        let client = test_client(true);
        let error = client.request_error(401, "challenge for sekrit-token");
        let message = error.to_string();
        assert!(message.contains("challenge for"));
        assert!(!message.contains("sekrit-token"));
        assert!(message.contains("Token fingerprint:"));
    }

    #[test]
    fn test_fingerprint_absent_outside_debug_mode() {
        let client = test_client(false);
        let error = client.request_error(500, "body");
        assert!(!error.to_string().contains("Token fingerprint:"));
    }

    #[test]
    fn test_classify_prefers_errors_over_partial_data() {
        let client = test_client(false);
        let body = r#"{"data":{"account":null},"errors":[{"message":"broken"}]}"#;
        let result = client.classify(body.to_string());
        assert!(matches!(result, Err(ClientError::Graphql { .. })));
    }

    #[test]
    fn test_classify_redacts_error_messages() {
        let client = test_client(false);
        let body = r#"{"errors":[{"message":"rejected sekrit-token"}]}"#;
        let Err(ClientError::Graphql { message, errors }) = client.classify(body.to_string())
        else {
            panic!("expected GraphQL error");
        };
        assert!(!message.contains("sekrit-token"));
        assert!(!errors[0].message.contains("sekrit-token"));
    }

    #[test]
    fn test_classify_returns_data_payload() {
        let client = test_client(false);
        let body = r#"{"data":{"account":{"id":"x"}}}"#;
        let data = client.classify(body.to_string()).unwrap();
        assert_eq!(data["account"]["id"], "x");
    }

    #[test]
    fn test_classify_empty_error_list_is_success() {
        let client = test_client(false);
        let body = r#"{"data":{"ok":true},"errors":[]}"#;
        let data = client.classify(body.to_string()).unwrap();
        assert_eq!(data["ok"], true);
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OcClient>();
    }
}
