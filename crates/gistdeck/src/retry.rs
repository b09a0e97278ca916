//! Retry with exponential backoff.
//!
//! Nothing in the gist client retries on its own. Callers opt in by
//! wrapping an operation with [`with_retry`], which only retries errors the
//! predicate marks as transient (see [`crate::GistError::is_retryable`]).

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

/// First delay between attempts.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Upper bound on a single delay.
pub const MAX_BACKOFF_MS: u64 = 8_000;

/// Retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: usize,
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(INITIAL_BACKOFF_MS),
            Duration::from_millis(MAX_BACKOFF_MS),
            DEFAULT_MAX_RETRIES,
        )
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay: max_delay.max(min_delay),
            max_retries,
            with_jitter: true,
        }
    }

    /// Run once, never retry.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Run `operation`, retrying while `is_retryable` says so.
///
/// Each retry is logged at debug level with `label` and the
/// `short_message` of the error that caused it.
///
/// ```ignore
/// let gist = with_retry(
///     || client.get_gist(id),
///     &RetryConfig::default(),
///     GistError::is_retryable,
///     short_error_message,
///     "get_gist",
/// )
/// .await?;
/// ```
pub async fn with_retry<T, E, F, Fut, IsRetryable, ShortMsg>(
    operation: F,
    config: &RetryConfig,
    is_retryable: IsRetryable,
    short_message: ShortMsg,
    label: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    IsRetryable: Fn(&E) -> bool,
    ShortMsg: Fn(&E) -> String,
{
    let mut retries = 0usize;

    operation
        .retry(config.backoff())
        .when(|e| is_retryable(e))
        .notify(|err, delay| {
            retries += 1;
            tracing::debug!(
                "{} failed ({}), retry {} in {:?}",
                label,
                short_message(err),
                retries,
                delay
            );
        })
        .await
}
