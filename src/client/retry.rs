//! Request timeout and retry policy
//!
//! Every remote call is bounded by a timeout and, when configured, repeated
//! with exponential backoff on retryable failures.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::client::retry::{with_retry, with_timeout};
//!
//! let page = with_retry(&config.retry, "GET page", || {
//!     with_timeout(timeout, fetch_page(), "GET page")
//! })
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::config::RetryConfig;
use crate::types::{Result, WikiError};

/// Backoff schedule for the configured retry policy
pub fn backoff(config: &RetryConfig) -> ExponentialBuilder {
    let builder = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.min_delay_ms))
        .with_max_delay(Duration::from_secs(config.max_delay_secs))
        .with_factor(config.factor)
        .with_max_times(config.max_retries as usize);

    if config.jitter {
        builder.with_jitter()
    } else {
        builder
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent. The last error is returned unchanged.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    operation
        .retry(backoff(config))
        .when(|err: &WikiError| err.is_retryable())
        .notify(|err: &WikiError, delay: Duration| {
            warn!("{} failed, retrying in {:?}: {}", operation_name, delay, err);
        })
        .await
}

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(WikiError::timeout(operation_name, timeout)),
    }
}
