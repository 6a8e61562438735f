use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

/// Requests-per-second budget the API enforces for this integration.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Proactive request pacer.
///
/// The walker acquires budget before each page request so the quota is
/// respected without waiting for the API to answer 429. Reactive rate-limit
/// handling still applies on top via the response classifier.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectRateLimiter>,
    period: Duration,
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::per_second(DEFAULT_REQUESTS_PER_SECOND)
    }
}

impl RequestPacer {
    pub fn per_second(limit: u32) -> Self {
        let safe_limit = NonZeroU32::new(limit.max(1)).expect("limit is clamped to at least 1");
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(safe_limit))),
            period: Duration::from_secs_f64(1.0 / f64::from(safe_limit.get())),
        }
    }

    /// Tries to take one request's worth of budget.
    ///
    /// When the budget is exhausted the suggested wait before trying again
    /// is returned.
    pub fn acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }

        Err(self.period)
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("period", &self.period)
            .finish()
    }
}
