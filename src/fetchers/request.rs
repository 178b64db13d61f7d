use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

use super::{FetchError, Fetcher};
use crate::config::HttpConfig;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) YemekScraper/1.0";

/// Statuses worth another try: rate limiting and gateway/server hiccups.
const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// How often and how patiently a failed request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each following one
    pub backoff_base: Duration,
    /// Upper bound for a single wait
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_millis(600),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Wait before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_base
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    fn is_retryable_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
    }
}

/// HTTP fetcher with a fixed user agent, a per-attempt timeout and
/// exponential backoff on transient failures.
pub struct RequestFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let timeout = timeout.unwrap_or(Duration::from_secs(15));
        Self::build(timeout, DEFAULT_USER_AGENT, RetryPolicy::default())
    }

    pub fn from_config(http: &HttpConfig) -> Result<Self, reqwest::Error> {
        Self::build(http.timeout(), &http.user_agent, http.retry_policy())
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn build(timeout: Duration, user_agent: &str, retry: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, retry })
    }
}

#[async_trait]
impl Fetcher for RequestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);

            let failure = match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => match response.text().await {
                    Ok(body) => return Ok(body),
                    Err(source) => {
                        if !RetryPolicy::is_retryable_error(&source) || attempt >= max_attempts {
                            return Err(FetchError::Request {
                                url: url.to_string(),
                                attempts: attempt,
                                source,
                            });
                        }
                        source.to_string()
                    }
                },
                Ok(response) => {
                    let status = response.status();
                    if !RetryPolicy::is_retryable_status(status) || attempt >= max_attempts {
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status,
                            attempts: attempt,
                        });
                    }
                    format!("HTTP {status}")
                }
                Err(source) => {
                    if !RetryPolicy::is_retryable_error(&source) || attempt >= max_attempts {
                        return Err(FetchError::Request {
                            url: url.to_string(),
                            attempts: attempt,
                            source,
                        });
                    }
                    source.to_string()
                }
            };

            let delay = self.retry.backoff(attempt);
            warn!(
                "Attempt {}/{} for {} failed ({}); retrying in {:?}",
                attempt, max_attempts, url, failure, delay
            );
            sleep(delay).await;
        }
    }
}
