// src/extract/fetch.rs
//! Article page retrieval over HTTP with a fixed-delay retry budget.

use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;

use crate::error::FetchError;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Source of raw article HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET with a fixed-delay retry budget.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    attempts: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_user_agent(BROWSER_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default HTTP client");
                Client::new()
            });
        Self {
            client,
            timeout: Duration::from_secs(10),
            attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts, not retries; clamped to at least one.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn fetch_once(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            counter!("article_fetch_attempts_total").increment(1);
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::warn!(
                        target: "extract",
                        url,
                        attempt,
                        attempts = self.attempts,
                        error = %e,
                        "article fetch failed"
                    );
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay).await;
                        continue;
                    }
                    counter!("article_fetch_failures_total").increment(1);
                    return Err(FetchError {
                        url: url.to_string(),
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}
