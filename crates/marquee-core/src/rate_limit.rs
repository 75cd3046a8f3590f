//! # Rate Limiter
//!
//! Bounds repeated attempts per string key within a time window.
//!
//! ## Per-Key State Machine
//! ```text
//!                 attempt
//!   NO_RECORD ─────────────► ACTIVE(count = 1, window_start = now)
//!                              │
//!        ┌─────────────────────┼──────────────────────────────┐
//!        │ now - start > window│ count < max                  │ count >= max
//!        ▼                     ▼                              ▼
//!   ACTIVE(1, now)        ACTIVE(count + 1)              reject with
//!   (allow)               (allow)                        retry-after
//! ```
//!
//! This is a reset-on-expiry window, not a true sliding window: the count
//! only starts over once the whole window has passed since its first attempt.
//! Records live until [`RateLimiter::reset`], [`RateLimiter::clear`] or
//! [`RateLimiter::prune_expired`] removes them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::RateLimited;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for deterministic tests. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        ManualClock {
            millis: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Policy
// =============================================================================

/// How many attempts a key gets per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(max_attempts: u32, window: Duration) -> Self {
        RateLimitPolicy {
            max_attempts,
            window,
        }
    }
}

impl Default for RateLimitPolicy {
    /// Three attempts per minute.
    fn default() -> Self {
        RateLimitPolicy::new(3, Duration::from_secs(60))
    }
}

/// An allowed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Attempts still available in the current window.
    pub remaining: u32,
}

// =============================================================================
// Rate Limiter
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    count: u32,
    window_start: i64,
}

/// Attempt counters keyed by caller-chosen strings.
#[derive(Debug)]
pub struct RateLimiter<C: Clock = SystemClock> {
    clock: C,
    records: HashMap<String, AttemptRecord>,
}

impl RateLimiter<SystemClock> {
    pub fn new() -> Self {
        RateLimiter::with_clock(SystemClock)
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(clock: C) -> Self {
        RateLimiter {
            clock,
            records: HashMap::new(),
        }
    }

    /// Records an attempt for `key`.
    ///
    /// ## Example
    /// ```rust
    /// use marquee_core::rate_limit::{ManualClock, RateLimiter};
    /// use std::time::Duration;
    ///
    /// let mut limiter = RateLimiter::with_clock(ManualClock::new(0));
    /// let window = Duration::from_secs(60);
    ///
    /// assert!(limiter.attempt("contact", 1, window).is_ok());
    /// let err = limiter.attempt("contact", 1, window).unwrap_err();
    /// assert_eq!(err.retry_after_secs, 60);
    /// ```
    pub fn attempt(
        &mut self,
        key: &str,
        max_attempts: u32,
        window: Duration,
    ) -> Result<Admission, RateLimited> {
        let now = self.clock.now_millis();
        let window_ms = window.as_millis() as i64;

        let record = match self.records.get_mut(key) {
            None => {
                self.records.insert(key.to_string(), fresh_record(now));
                debug!(key, "First attempt in window");
                return Ok(Admission {
                    remaining: max_attempts.saturating_sub(1),
                });
            }
            Some(record) => record,
        };

        let elapsed = now - record.window_start;
        if elapsed > window_ms {
            *record = fresh_record(now);
            debug!(key, "Window expired, counter reset");
            return Ok(Admission {
                remaining: max_attempts.saturating_sub(1),
            });
        }

        if record.count < max_attempts {
            record.count += 1;
            return Ok(Admission {
                remaining: max_attempts - record.count,
            });
        }

        let remaining_ms = (window_ms - elapsed).max(0) as u64;
        let retry_after_secs = remaining_ms.div_ceil(1000).max(1);
        warn!(key, retry_after_secs, "Rate limit exceeded");
        Err(RateLimited { retry_after_secs })
    }

    /// [`attempt`](Self::attempt) with the limits taken from `policy`.
    pub fn check(&mut self, key: &str, policy: &RateLimitPolicy) -> Result<Admission, RateLimited> {
        self.attempt(key, policy.max_attempts, policy.window)
    }

    /// Forgets `key`, so its next attempt starts a fresh window.
    pub fn reset(&mut self, key: &str) -> bool {
        self.records.remove(key).is_some()
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drops records whose window has fully elapsed. Returns how many.
    pub fn prune_expired(&mut self, window: Duration) -> usize {
        let now = self.clock.now_millis();
        let window_ms = window.as_millis() as i64;
        let before = self.records.len();
        self.records
            .retain(|_, record| now - record.window_start <= window_ms);
        before - self.records.len()
    }

    /// Keys with a live record, sorted.
    pub fn tracked_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.records.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn fresh_record(now: i64) -> AttemptRecord {
    AttemptRecord {
        count: 1,
        window_start: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
