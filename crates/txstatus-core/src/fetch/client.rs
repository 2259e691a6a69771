use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header;
use tracing::{debug, trace};

use crate::error::{ProviderError, StatusError};

use super::{redact_url, HttpFetch};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Shared HTTPS client for the explorer APIs.
///
/// One instance is meant to be shared by every adapter so connection pooling
/// and the optional rate limit apply across providers.
pub struct HttpClient {
    client: reqwest::Client,
    limiter: Option<DirectRateLimiter>,
}

impl HttpClient {
    /// If `requests_per_second` is set, every outbound GET waits for a slot
    /// first. Anonymous explorer access is throttled upstream, so bursting
    /// past it only turns into 429s.
    pub fn new(requests_per_second: Option<u32>) -> Result<Self, StatusError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(8)
            .user_agent(concat!("txstatus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StatusError::InvalidConfig(format!("build HTTP client: {e}")))?;

        let limiter = match requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    StatusError::InvalidConfig("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self { client, limiter })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl HttpFetch for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        self.wait_for_rate_limit().await;
        let shown = redact_url(url);
        debug!(http.url = %shown, "http get");

        // reqwest embeds the full URL in its messages; ours carries the
        // redacted one instead.
        let transport = |e: reqwest::Error| ProviderError::Transport {
            url: shown.clone(),
            message: e.without_url().to_string(),
        };

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();

        let body = response.text().await.map_err(transport)?;
        debug!(http.url = %shown, %status, body_len = body.len(), "http response");
        trace!(http.url = %shown, body = %body, "http response body");

        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                url: shown,
                status: status.as_u16(),
            });
        }

        Ok(body)
    }
}
