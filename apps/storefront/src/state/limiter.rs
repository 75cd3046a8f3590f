//! Per-form attempt limiting for the session.

use std::sync::{Arc, Mutex, PoisonError};

use marquee_core::rate_limit::{Admission, Clock, RateLimitPolicy, RateLimiter};
use marquee_core::RateLimited;

pub struct LimiterState {
    limiter: Mutex<RateLimiter<Arc<dyn Clock>>>,
    policy: RateLimitPolicy,
}

impl LimiterState {
    pub fn new(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        LimiterState {
            limiter: Mutex::new(RateLimiter::with_clock(clock)),
            policy,
        }
    }

    /// Counts one attempt for the form named `key`.
    pub fn check(&self, key: &str) -> Result<Admission, RateLimited> {
        self.limiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .check(key, &self.policy)
    }

    pub fn reset(&self, key: &str) -> bool {
        self.limiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset(key)
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }
}
