//! # marquee-core: Pure Business Logic for Marquee
//!
//! This crate holds the ticket-ordering logic for the Marquee event site
//! as pure functions and plain data structures with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Marquee Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/storefront (client session)                │   │
//! │  │    Buy Tickets ──► Cart ──► Checkout ──► Upload Receipt         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ marquee-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │  types    │  │  sanitize │  │    cart     │  │   rate   │  │   │
//! │  │   │ LineItem  │  │  coerce   │  │ CartStore   │  │  limit   │  │   │
//! │  │   │  Money    │  │  clamp    │  │ persistence │  │          │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              apps/server + marquee-db                           │   │
//! │  │      receipt upload, submission ledger, notifications           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (minor units)
//! - [`types`] - Line items, contact details, raw ticket candidates
//! - [`sanitize`] - Item sanitizer and form-field sanitizers
//! - [`validation`] - Form-boundary validation rules
//! - [`cart`] - The cart store with derived totals
//! - [`persistence`] - Storage slot trait and fail-safe cart codec
//! - [`rate_limit`] - Reset-on-expiry attempt limiter
//! - [`summary`] - Plain-text order summary
//! - [`pricing`] - Ticket price defaults and cache
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use marquee_core::cart::CartStore;
//! use marquee_core::persistence::MemorySlot;
//! use marquee_core::types::TicketCandidate;
//! use serde_json::json;
//!
//! let mut cart = CartStore::hydrate(MemorySlot::new());
//! cart.add(Some(TicketCandidate::from_json(&json!({
//!     "ticketCount": 25,
//!     "unitPrice": 100,
//! })).unwrap()));
//!
//! // Quantity is clamped to 20, total follows
//! assert_eq!(cart.item_count(), 20);
//! assert_eq!(cart.grand_total().minor(), 2000 * 100);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod persistence;
pub mod pricing;
pub mod rate_limit;
pub mod sanitize;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::CartStore;
pub use error::{CoreError, CoreResult, RateLimited, SlotError, ValidationError};
pub use money::Money;
pub use rate_limit::{RateLimitPolicy, RateLimiter};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fewest tickets a single line item may hold.
pub const MIN_TICKETS_PER_ITEM: u32 = 1;

/// Most tickets a single line item may hold.
///
/// ## Business Reason
/// One purchase intent is one buyer; bulk orders go through the box office.
pub const MAX_TICKETS_PER_ITEM: u32 = 20;

/// Storage slot key the storefront persists the cart under.
pub const CART_STORAGE_KEY: &str = "marquee-cart";

/// Rate limiter key used by the contact form.
pub const CONTACT_LIMIT_KEY: &str = "contact";

/// Rate limiter key used by the manual payment submission.
pub const PAYMENT_LIMIT_KEY: &str = "payment";
