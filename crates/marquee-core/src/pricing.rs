//! # Ticket Pricing
//!
//! The price service is consulted before a ticket is added to the cart. Its
//! answer is cached for a few minutes and a hardcoded default covers the
//! case where it is unreachable or answers nonsense.
//!
//! ```text
//!   PriceCache::get(now) ── hit ──► cached price
//!        │ miss / stale
//!        ▼
//!   fetch from server ── accept_price ok ──► store(price, now)
//!        │ error or rejected
//!        ▼
//!   DEFAULT_TICKET_PRICE
//! ```

use serde_json::Value;
use std::time::Duration;

use crate::money::Money;

/// Fallback price when the price service cannot be used (₦6,499).
pub const DEFAULT_TICKET_PRICE: Money = Money::from_major(6499);

/// How long a fetched price is trusted.
pub const PRICE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Last accepted price and when it was fetched.
#[derive(Debug, Clone)]
pub struct PriceCache {
    ttl: Duration,
    entry: Option<(Money, i64)>,
}

impl Default for PriceCache {
    fn default() -> Self {
        PriceCache::new(PRICE_CACHE_TTL)
    }
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        PriceCache { ttl, entry: None }
    }

    /// Cached price if it was stored less than one TTL before `now_millis`.
    pub fn get(&self, now_millis: i64) -> Option<Money> {
        let (price, stored_at) = self.entry?;
        let age = now_millis.saturating_sub(stored_at);
        (age < self.ttl.as_millis() as i64).then_some(price)
    }

    pub fn store(&mut self, price: Money, now_millis: i64) {
        self.entry = Some((price, now_millis));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

/// Reads a price service answer (major units).
///
/// Only a strictly positive finite number, or a string holding one, is
/// accepted.
pub fn accept_price(value: &Value) -> Option<Money> {
    let major = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !major.is_finite() || major <= 0.0 {
        return None;
    }
    Money::from_major_f64(major).filter(Money::is_positive)
}
