//! Retry with exponential backoff for outbound HTTP calls.
//!
//! Transport failures (connect errors, timeouts) and gateway-class statuses are
//! retried; every other response is handed back to the caller as-is.

use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Retry attempts after the initial one.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Small backoffs, for latency-sensitive request paths.
    pub fn quick() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let backoff_ms = backoff.min(self.max_backoff.as_millis() as f64) as u64;

        let mut duration = Duration::from_millis(backoff_ms);

        if self.add_jitter {
            // up to 25%
            let jitter = (backoff_ms as f64 * 0.25 * rand_jitter()) as u64;
            duration += Duration::from_millis(jitter);
        }

        duration
    }
}

fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Execute an HTTP call, retrying transient failures.
///
/// When retries run out on a retryable status, the last response is returned so the
/// caller can still inspect it.
pub async fn retry_http_call<F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;

    loop {
        let outcome = f().await;

        let reason = match &outcome {
            Ok(response) if !is_retryable_status(response.status()) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "HTTP call succeeded after retry"
                    );
                }
                return outcome;
            }
            Ok(response) => format!("status {}", response.status()),
            Err(err) if is_retryable_error(err) => err.to_string(),
            Err(err) => {
                warn!(
                    operation = operation_name,
                    error = %err,
                    "HTTP call failed with non-retryable error"
                );
                return outcome;
            }
        };

        if attempt >= config.max_retries {
            warn!(
                operation = operation_name,
                attempt = attempt + 1,
                reason = %reason,
                "HTTP call failed after max retries"
            );
            return outcome;
        }

        let backoff = config.backoff_duration(attempt);
        warn!(
            operation = operation_name,
            attempt = attempt + 1,
            reason = %reason,
            backoff_ms = backoff.as_millis(),
            "HTTP call failed, retrying after backoff"
        );

        sleep(backoff).await;
        attempt += 1;
    }
}
