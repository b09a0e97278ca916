//! Client-side request pacing.
//!
//! GitHub meters gist traffic per hour and rejects bursts on the search
//! endpoint, so a keyword search (one content query, up to ten gist
//! lookups and several listing pages) is smoothed out before it leaves the
//! process.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Requests per second used when pacing is on and nothing is configured.
pub const GITHUB_DEFAULT_RPS: u32 = 10;

/// Shared request budget. Clones draw from the same quota, so every clone
/// of a [`crate::GistClient`] is paced together.
#[derive(Clone)]
pub struct ApiRateLimiter {
    limiter: Arc<DirectLimiter>,
    per_second: NonZeroU32,
    burst: NonZeroU32,
}

impl fmt::Debug for ApiRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiRateLimiter({}/s, burst {})", self.per_second, self.burst)
    }
}

impl ApiRateLimiter {
    /// Allow `requests_per_second`, with a burst of the same size. Zero is
    /// treated as one.
    pub fn new(requests_per_second: u32) -> Self {
        Self::with_burst(requests_per_second, requests_per_second)
    }

    /// Like [`ApiRateLimiter::new`] but with an explicit burst size.
    pub fn with_burst(requests_per_second: u32, burst: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            per_second,
            burst,
        }
    }

    pub fn requests_per_second(&self) -> u32 {
        self.per_second.get()
    }

    pub fn burst(&self) -> u32 {
        self.burst.get()
    }

    /// Take a slot if one is free right now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Wait for a slot.
    pub async fn wait(&self) {
        if self.try_acquire() {
            return;
        }
        tracing::debug!("Request budget spent, pacing at {}/s", self.per_second);
        self.limiter.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_are_clamped_to_one() {
        let limiter = ApiRateLimiter::with_burst(0, 0);
        assert_eq!(limiter.requests_per_second(), 1);
        assert_eq!(limiter.burst(), 1);

        let limiter = ApiRateLimiter::new(25);
        assert_eq!(limiter.requests_per_second(), 25);
        assert_eq!(limiter.burst(), 25);
    }

    #[test]
    fn test_burst_is_exhausted_then_refused() {
        let limiter = ApiRateLimiter::with_burst(1, 3);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_clones_share_the_budget() {
        let limiter = ApiRateLimiter::with_burst(1, 1);
        let clone = limiter.clone();
        assert!(limiter.try_acquire());
        assert!(!clone.try_acquire());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_within_burst() {
        let limiter = ApiRateLimiter::new(GITHUB_DEFAULT_RPS);
        for _ in 0..GITHUB_DEFAULT_RPS {
            limiter.wait().await;
        }
        assert!(!limiter.try_acquire());
    }
}
