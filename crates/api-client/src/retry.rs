use std::time::Duration;

use tracing::warn;

/// Retry behaviour for idempotent GET requests.
///
/// The analyze endpoint runs a backend compute step and is never routed
/// through here.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub delays_ms: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays_ms: vec![250, 500, 1000],
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delays_ms: Vec::new(),
        }
    }

    /// `max_retries` attempts with doubling delays starting at 250ms.
    pub fn with_max_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            delays_ms: (0..max_retries).map(|i| 250u64 << i.min(4)).collect(),
        }
    }

    fn delay(&self, attempt: usize) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let ms = self
            .delays_ms
            .get(attempt)
            .or(self.delays_ms.last())
            .copied()
            .unwrap_or(0);
        Some(Duration::from_millis(ms))
    }
}

/// Retry an HTTP GET with backoff.
///
/// Retries on network errors and 5xx responses.
/// Returns immediately on success or 4xx.
pub async fn retry_get(
    client: &reqwest::Client,
    url: &str,
    auth_token: Option<&str>,
    config: &RetryConfig,
) -> reqwest::Result<reqwest::Response> {
    let max_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        let mut req = client.get(url).header("Accept", "application/json");
        if let Some(token) = auth_token {
            req = req.bearer_auth(token);
        }

        match req.send().await {
            Ok(resp) if resp.status().is_server_error() => match config.delay(attempt) {
                Some(delay) => {
                    warn!(
                        "GET {} attempt {}/{} failed (HTTP {}), retrying in {}ms…",
                        url,
                        attempt + 1,
                        max_attempts,
                        resp.status(),
                        delay.as_millis(),
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Ok(resp),
            },
            Ok(resp) => return Ok(resp),
            Err(e) => match config.delay(attempt) {
                Some(delay) => {
                    warn!(
                        "GET {} attempt {}/{} failed ({}), retrying in {}ms…",
                        url,
                        attempt + 1,
                        max_attempts,
                        e,
                        delay.as_millis(),
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(e),
            },
        }

        attempt += 1;
    }
}
