use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use cyclegraph_api::{PROFILE_PATH, ProfileResponse, SESSIONS_LIST_PATH, SessionReport};

use crate::error::{ApiError, Result};
use crate::retry::{RetryConfig, retry_get};

/// Typed HTTP client for the CycleGraph API.
///
/// Requests carry the cookie jar of the underlying `reqwest::Client` plus an
/// optional bearer token. Idempotent GETs go through [`retry_get`]; the
/// analyze POST is sent exactly once.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    retry: RetryConfig,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token).filter(|t| !t.is_empty());
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access the underlying `reqwest::Client`.
    pub fn reqwest_client(&self) -> &reqwest::Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {url}");
        let resp = retry_get(&self.client, &url, self.auth_token(), &self.retry).await?;
        parse_response(resp).await
    }

    // ── Sessions ──────────────────────────────────────────────────────────

    /// Raw directory payload. The shape varies (bare array, `value`, `rows`);
    /// callers normalize it.
    pub async fn list_sessions_raw(&self) -> Result<Value> {
        self.get_json(SESSIONS_LIST_PATH).await
    }

    /// Run the backend analysis for one session and return its report.
    pub async fn analyze_session(&self, id: &str) -> Result<SessionReport> {
        let url = self.url(&cyclegraph_api::analyze_path(id));
        debug!("POST {url}");
        let mut req = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&serde_json::json!({}));
        if let Some(token) = self.auth_token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        parse_response(resp).await
    }

    // ── Profile ───────────────────────────────────────────────────────────

    pub async fn profile(&self) -> Result<ProfileResponse> {
        self.get_json(PROFILE_PATH).await
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx, or
/// [`ApiError::Status`] carrying the body's `detail`/`error` string.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail: cyclegraph_api::error_detail(&body),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5))
            .unwrap()
            .with_retry(RetryConfig {
                max_retries: 2,
                delays_ms: vec![1],
            })
    }

    #[tokio::test]
    async fn list_sessions_raw_returns_payload_untouched() {
        let (base, seen) = serve(vec![(200, r#"{"value":[{"session_id":"1"}],"Count":1}"#)]).await;

        let raw = client(&base).list_sessions_raw().await.unwrap();
        assert_eq!(raw["Count"], 1);
        assert_eq!(raw["value"][0]["session_id"], "1");

        let seen = seen.await.unwrap();
        assert_eq!(seen[0].request_line, "GET /api/sessions/list/all HTTP/1.1");
    }

    #[tokio::test]
    async fn non_success_maps_detail_into_status_error() {
        let (base, _seen) = serve(vec![(404, r#"{"detail":"no such rider"}"#)]).await;

        let err = client(&base).list_sessions_raw().await.unwrap_err();
        match err {
            ApiError::Status { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail.as_deref(), Some("no such rider"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn server_errors_on_get_are_retried() {
        let (base, seen) = serve(vec![
            (503, r#"{"error":"warming up"}"#),
            (200, r#"[{"ride_id":"7"}]"#),
        ])
        .await;

        let raw = client(&base).list_sessions_raw().await.unwrap();
        assert_eq!(raw[0]["ride_id"], "7");
        assert_eq!(seen.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn analyze_is_posted_once_even_on_server_error() {
        let (base, seen) = serve(vec![(500, r#"{"detail":"ValueError: samples must be a list"}"#)]).await;

        let err = client(&base).analyze_session("42").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.detail(), Some("ValueError: samples must be a list"));

        let seen = seen.await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].request_line, "POST /api/sessions/42/analyze HTTP/1.1");
    }

    #[tokio::test]
    async fn analyze_returns_opaque_report() {
        let (base, _seen) = serve(vec![(
            200,
            r#"{"metrics":{"precision_watt":212.4},"source":"rust"}"#,
        )])
        .await;

        let report = client(&base).analyze_session("42").await.unwrap();
        assert_eq!(report.precision_watt(), Some(212.4));
        assert_eq!(report.source(), Some("rust"));
    }

    #[tokio::test]
    async fn bearer_token_is_sent_when_configured() {
        let (base, seen) = serve(vec![(200, r#"{"profile_version":"v1-abc-20250601"}"#)]).await;

        let mut api = client(&base);
        api.set_auth("secret-token".into());
        let profile = api.profile().await.unwrap();
        assert_eq!(profile.version_token(), Some("v1-abc-20250601"));

        let seen = seen.await.unwrap();
        assert_eq!(seen[0].request_line, "GET /api/profile/get HTTP/1.1");
        assert!(seen[0].headers.contains("authorization: bearer secret-token"));
    }

    #[tokio::test]
    async fn garbage_success_body_is_a_json_error() {
        let (base, _seen) = serve(vec![(200, "<html>oops</html>")]).await;
        let err = client(&base).profile().await.unwrap_err();
        assert!(matches!(err, ApiError::Json(_)));
    }

    #[test]
    fn empty_auth_token_is_ignored() {
        let mut api = ApiClient::new("http://localhost:1/", Duration::from_secs(1)).unwrap();
        api.set_auth(String::new());
        assert_eq!(api.auth_token(), None);
        assert_eq!(api.base_url(), "http://localhost:1");
    }
}
