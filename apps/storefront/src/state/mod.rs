//! # State Module
//!
//! Session state, split by concern so each command takes only what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │    CartState     │  │   LimiterState   │  │    PriceState    │      │
//! │  │                  │  │                  │  │                  │      │
//! │  │  Arc<Mutex<      │  │  Mutex<          │  │  Mutex<          │      │
//! │  │    CartStore>>   │  │    RateLimiter>  │  │    PriceCache>   │      │
//! │  │  FileSlot-backed │  │  "payment",      │  │  5 minute TTL    │      │
//! │  │                  │  │  "contact"       │  │                  │      │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  Locks are held only for the synchronous mutation. Network calls work  │
//! │  on a snapshot and apply a follow-up mutation when they complete.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod limiter;
mod price;

pub use cart::{CartState, SessionSlot};
pub use limiter::LimiterState;
pub use price::PriceState;
