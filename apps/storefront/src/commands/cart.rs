//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐  add_tickets   ┌──────────┐  checkout   ┌──────────┐      │
//! │  │  Empty   │───────────────►│ In Cart  │────────────►│ Submitted│      │
//! │  └──────────┘                └──────────┘  (success)  └────┬─────┘      │
//! │       ▲                        │  remove_item               │           │
//! │       │                        │  set_quantity              │ cleared   │
//! │       │        clear_cart      │                            │           │
//! │       └────────────────────────┴────────────────────────────┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use marquee_core::sanitize::{sanitize_email, sanitize_name, sanitize_phone, sanitize_string};
use marquee_core::validation::{validate_buyer, validate_ticket_quantity};
use marquee_core::{
    CartTotals, ContactDetails, LineItem, LineItemId, TicketCandidate, ValidationError,
};

use crate::error::{StorefrontError, StorefrontResult};
use crate::Storefront;

/// Longest accepted location text.
const MAX_LOCATION_LEN: usize = 100;

/// Cart contents with derived totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
}

/// Adds one purchase intent.
///
/// The buyer form is validated as typed, then each field is sanitized before
/// it reaches the cart. The unit price comes from the price service.
pub async fn add_tickets(
    sf: &Storefront,
    ticket_count: i64,
    buyer: &ContactDetails,
) -> StorefrontResult<LineItemId> {
    debug!(ticket_count, "add_tickets command");

    let count = validate_ticket_quantity(ticket_count)?;
    validate_buyer(buyer)?;

    let contact = ContactDetails {
        first_name: sanitize_name(&buyer.first_name),
        last_name: sanitize_name(&buyer.last_name),
        email: sanitize_email(&buyer.email),
        phone: sanitize_phone(&buyer.phone),
        location: sanitize_string(&buyer.location, MAX_LOCATION_LEN),
        whatsapp: sanitize_phone(&buyer.whatsapp),
    };

    let price = sf.price.current(sf.api.as_ref()).await;
    let candidate = TicketCandidate::new(count, price.as_major_f64()).with_contact(&contact);

    let id = sf
        .cart
        .with_cart_mut(|cart| cart.add(Some(candidate)))
        .ok_or_else(|| ValidationError::Required {
            field: "ticketCount".into(),
        })?;

    info!(id = %id, count, %price, "Tickets added to cart");
    Ok(id)
}

pub fn list_cart(sf: &Storefront) -> CartView {
    debug!("list_cart command");
    sf.cart.with_cart(|cart| CartView {
        items: cart.snapshot(),
        totals: cart.totals(),
    })
}

pub fn remove_item(sf: &Storefront, id: &str) -> StorefrontResult<()> {
    debug!(id, "remove_item command");
    let item_id = parse_id(id)?;

    if sf.cart.with_cart_mut(|cart| cart.remove(item_id)) {
        Ok(())
    } else {
        Err(StorefrontError::ItemNotFound(id.to_string()))
    }
}

/// Sets an item's ticket count. Counts outside 1..=20 are rejected here;
/// the store itself would ignore them silently.
pub fn set_quantity(sf: &Storefront, id: &str, count: i64) -> StorefrontResult<()> {
    debug!(id, count, "set_quantity command");
    let item_id = parse_id(id)?;

    validate_ticket_quantity(count)?;

    if sf
        .cart
        .with_cart_mut(|cart| cart.update_quantity(item_id, count))
    {
        Ok(())
    } else {
        Err(StorefrontError::ItemNotFound(id.to_string()))
    }
}

pub fn clear_cart(sf: &Storefront) {
    debug!("clear_cart command");
    sf.cart.with_cart_mut(|cart| cart.clear());
}

fn parse_id(id: &str) -> StorefrontResult<LineItemId> {
    LineItemId::parse(id.trim()).ok_or_else(|| StorefrontError::ItemNotFound(id.to_string()))
}
