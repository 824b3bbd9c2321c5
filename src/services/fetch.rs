//! HTTP GET with retry policy, returning parsed JSON or a typed failure.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::errors::FetchError;

/// Some providers reject the default reqwest agent.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; cyclewatch/0.1; +https://github.com/cyclewatch)";

pub const MAX_ATTEMPTS_LIMIT: usize = 5;

pub type FetchOutcome = Result<Value, FetchError>;

/// A provider-specific GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome;
}

/// Exponential backoff between attempts of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: usize,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS_LIMIT),
            initial_backoff,
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_backoff)
            .with_max_delay(self.max_backoff.max(self.initial_backoff))
            .with_factor(2.0)
            .with_jitter()
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}

/// Stateless reqwest-backed fetcher.
pub struct FetchClient {
    client: reqwest::Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl FetchClient {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(client, timeout, retry)
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    async fn attempt(&self, request: &FetchRequest) -> FetchOutcome {
        let mut builder = self
            .client
            .get(&request.url)
            .query(&request.query)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::http(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&body).map_err(|e| FetchError::parse(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        let started = Instant::now();
        let url = request.url.as_str();

        let outcome = (|| async move { self.attempt(request).await })
            .retry(self.retry.backoff())
            .sleep(tokio::time::sleep)
            .when(FetchError::is_transient)
            .notify(|err: &FetchError, delay: Duration| {
                warn!(
                    url = %url,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Transient fetch failure, retrying in {:?}",
                    delay
                );
            })
            .await;

        debug!(
            url = %url,
            ok = outcome.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Fetch finished"
        );
        outcome
    }
}

fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::transport("timeout")
    } else {
        FetchError::transport(err.to_string())
    }
}
