//! # marquee-storefront
//!
//! The client session of the Marquee ticket site: the cart, the per-form
//! rate limiters, the ticket price cache and the API client, held together
//! by one explicitly constructed [`Storefront`].
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront::open(config)                                               │
//! │     ├── FileSlot(<data_dir>/marquee-cart.json) ──► CartState (hydrate)  │
//! │     ├── LimiterState  (3 attempts / 60 s per form)                      │
//! │     ├── PriceState    (5 minute cache)                                  │
//! │     └── ApiClient     (reqwest, 30 s timeout)                           │
//! │                                                                         │
//! │  commands::* (&Storefront, ...)                                         │
//! │     add ─ cart ─ remove ─ qty ─ clear ─ checkout ─ contact ─ subscribe  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod slot;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use marquee_core::rate_limit::{Clock, SystemClock};
use marquee_core::CART_STORAGE_KEY;

pub use api::{ApiClient, OrderApi};
pub use config::StorefrontConfig;
pub use error::{ClientError, StorefrontError, StorefrontResult};
pub use slot::FileSlot;
pub use state::{CartState, LimiterState, PriceState, SessionSlot};

/// One client session.
pub struct Storefront {
    pub config: StorefrontConfig,
    pub cart: CartState,
    pub limiter: LimiterState,
    pub price: PriceState,
    pub api: Arc<dyn OrderApi>,
}

impl Storefront {
    /// Opens a session against the configured server with the cart stored
    /// in the data directory.
    pub fn open(config: StorefrontConfig) -> StorefrontResult<Self> {
        let slot = FileSlot::new(config.data_dir(), CART_STORAGE_KEY);
        info!(path = %slot.path().display(), "Opening storefront session");

        let api = ApiClient::new(&config)?;
        Ok(Self::new(
            config,
            Box::new(slot),
            Arc::new(api),
            Arc::new(SystemClock),
        ))
    }

    /// Assembles a session from explicit parts.
    pub fn new(
        config: StorefrontConfig,
        slot: SessionSlot,
        api: Arc<dyn OrderApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let limiter = LimiterState::new(config.rate_limit.policy(), clock.clone());
        Storefront {
            cart: CartState::new(slot),
            limiter,
            price: PriceState::new(clock),
            api,
            config,
        }
    }
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins; otherwise `info,marquee=debug,sqlx=warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,marquee=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
