//! Outbound rate limiter for the OpenWeather API.
//!
//! Free-tier budget is 60 calls/min; the default stays under it.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Process-wide request budget towards the provider.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limiter: Arc<GovLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,
}

impl RateLimiter {
    /// Create with the default budget (50 requests/minute).
    pub fn new() -> Self {
        Self::with_limit(50)
    }

    /// Create with a custom per-minute budget. Zero is clamped to one.
    pub fn with_limit(requests_per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute.max(1)).unwrap());

        Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Wait until a request slot is available.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to take a slot without waiting. Returns true if acquired.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_fits_within_budget() {
        let limiter = RateLimiter::with_limit(60);
        for _ in 0..10 {
            assert!(limiter.try_acquire());
        }
    }

    #[test]
    fn exhausted_budget_denies() {
        let limiter = RateLimiter::with_limit(1);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
