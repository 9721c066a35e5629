//! Wayback Machine HTTP client.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use governor::{Quota, RateLimiter};
use rand::Rng;
use reqwest::{header, Client, Response, StatusCode};

use crate::archive::fetcher::{ArchiveFetcher, StreamedBody};
use crate::config::ArchiveConfig;
use crate::error::{Error, Result};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Connect timeout for archive requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Base delay before the first retry.
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// HTTP client for the archive with rate limiting and retries.
///
/// One client is shared by every worker so they share the connection pool and
/// the request budget.
pub struct WaybackClient {
    client: Client,
    limiter: Arc<DefaultRateLimiter>,
    max_attempts: u32,
}

impl WaybackClient {
    /// Create a new client allowing `requests_per_second` requests.
    pub fn new(archive: &ArchiveConfig, requests_per_second: u32) -> Result<Self> {
        let rate = NonZeroU32::new(requests_per_second).ok_or_else(|| Error::ConfigValidation {
            field: "requests_per_second".to_string(),
            message: "Rate limit must be at least 1 request per second".to_string(),
        })?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("text/html,application/json,video/*;q=0.9,*/*;q=0.8"),
        );

        let client = Client::builder()
            .user_agent(&archive.user_agent)
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(archive.timeout_seconds))
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
            max_attempts: archive.max_attempts.max(1),
        })
    }

    /// Send a GET request, retrying transient failures with backoff.
    async fn get(&self, url: &str) -> Result<Response> {
        with_retries(url, self.max_attempts, move || async move {
            self.limiter.until_ready().await;
            self.try_get(url).await
        })
        .await
    }

    async fn try_get(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited(url.to_string()));
        }

        if !status.is_success() {
            return Err(Error::Fetch(format!("HTTP {} for {}", status, url)));
        }

        Ok(response)
    }
}

/// Run `attempt` until it succeeds, fails with a non-transient error, or
/// `max_attempts` attempts have been made.
async fn with_retries<T, F, Fut>(url: &str, max_attempts: u32, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut made = 1;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && made < max_attempts => {
                let delay = retry_delay(made);
                tracing::warn!(
                    "Attempt {}/{} for {} failed: {} (retrying in {:?})",
                    made,
                    max_attempts,
                    url,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                made += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Exponential backoff with jitter: 1s, 2s, 4s, ... plus up to 500ms.
fn retry_delay(attempt: u32) -> Duration {
    let exp = RETRY_BASE_DELAY_MS.saturating_mul(1 << (attempt - 1).min(6));
    let jitter = rand::thread_rng().gen_range(0..500);
    Duration::from_millis(exp + jitter)
}

#[async_trait]
impl ArchiveFetcher for WaybackClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to read body of {}: {}", url, e)))?;
        tracing::debug!("Fetched {} ({} bytes)", url, text.len());
        Ok(text)
    }

    async fn fetch_stream(&self, url: &str) -> Result<StreamedBody> {
        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::Download(format!("Stream error: {}", e))))
            .boxed();

        Ok(StreamedBody {
            content_type,
            content_length,
            stream,
        })
    }
}
