//! Ticket price lookup with a five minute cache.
//!
//! A failed or nonsensical lookup falls back to the default price and is not
//! cached, so the next call tries the server again.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use marquee_core::pricing::{accept_price, PriceCache, DEFAULT_TICKET_PRICE, PRICE_CACHE_TTL};
use marquee_core::rate_limit::Clock;
use marquee_core::Money;

use crate::api::OrderApi;

pub struct PriceState {
    cache: Mutex<PriceCache>,
    clock: Arc<dyn Clock>,
}

impl PriceState {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        PriceState {
            cache: Mutex::new(PriceCache::new(PRICE_CACHE_TTL)),
            clock,
        }
    }

    /// Current ticket price: cached, fetched, or the default.
    pub async fn current(&self, api: &dyn OrderApi) -> Money {
        let cached = self.lock().get(self.clock.now_millis());
        if let Some(price) = cached {
            debug!(%price, "Ticket price from cache");
            return price;
        }

        match api.fetch_ticket_price().await {
            Ok(raw) => match accept_price(&raw) {
                Some(price) => {
                    self.lock().store(price, self.clock.now_millis());
                    debug!(%price, "Ticket price fetched");
                    price
                }
                None => {
                    warn!(value = %raw, "Server sent an unusable ticket price, using default");
                    DEFAULT_TICKET_PRICE
                }
            },
            Err(e) => {
                warn!(error = %e, "Could not fetch ticket price, using default");
                DEFAULT_TICKET_PRICE
            }
        }
    }

    /// Forgets the cached price.
    pub fn invalidate(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PriceCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
