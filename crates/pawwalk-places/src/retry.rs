//! Exponential backoff for Places HTTP calls.
//!
//! Retried: timeouts, connection failures, 5xx, 429 and 408.
//! Everything else, including 401/403, is returned as-is.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 200;
pub const DEFAULT_MAX_DELAY_MS: u64 = 4000;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Single attempt, no backoff
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Backoff before retry number `retry` (zero based)
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

pub fn classify_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() || error.is_connect() {
        return RetryDecision::Retry;
    }
    if error.is_request() {
        return RetryDecision::NoRetry;
    }
    match error.status() {
        Some(status) => classify_status(status),
        None => RetryDecision::NoRetry,
    }
}

pub fn classify_status(status: StatusCode) -> RetryDecision {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

/// Run `operation` until it yields a non-retryable outcome or retries run out.
///
/// On the last attempt a retryable status response is returned to the caller
/// unchanged so it can report the status.
pub async fn with_retry<F, Fut>(
    config: &RetryConfig,
    operation: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut retry = 0;
    loop {
        let exhausted = retry >= config.max_retries;

        match operation().await {
            Ok(response) => {
                let status = response.status();
                if exhausted || classify_status(status) == RetryDecision::NoRetry {
                    if retry > 0 {
                        tracing::info!("Request finished with {} after {} retries", status, retry);
                    }
                    return Ok(response);
                }
                tracing::warn!(
                    "Retryable status {} on attempt {} of {}",
                    status,
                    retry + 1,
                    config.max_retries + 1
                );
            }
            Err(e) => {
                if classify_error(&e) == RetryDecision::NoRetry {
                    tracing::debug!("Non-retryable error: {}", e);
                    return Err(e);
                }
                if exhausted {
                    tracing::error!("All {} attempts failed: {}", config.max_retries + 1, e);
                    return Err(e);
                }
                tracing::warn!(
                    "Retryable error on attempt {} of {}: {}",
                    retry + 1,
                    config.max_retries + 1,
                    e
                );
            }
        }

        tokio::time::sleep(config.delay_for_attempt(retry)).await;
        retry += 1;
    }
}
