//! # Cart Store
//!
//! The ordered collection of line items for one client session.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Cart Lifecycle                                 │
//! │                                                                         │
//! │   hydrate(slot) ──► ┌──────────┐  add / remove / update_quantity        │
//! │                     │  ACTIVE  │ ◄──────────────────────┐               │
//! │                     │          │ ───────────────────────┘               │
//! │                     └────┬─────┘   (each persists the full list)        │
//! │                          │                                              │
//! │                          │ clear()  (after payment, or by the user)     │
//! │                          ▼                                              │
//! │                     ┌──────────┐                                        │
//! │                     │  EMPTY   │  slot key removed                      │
//! │                     └──────────┘                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//! - **No stored aggregates**: `item_count` and `grand_total` fold over the
//!   live list on every call, so they cannot drift.
//! - **No merging**: two identical adds are two line items.
//! - **Silent correction**: out-of-range input is clamped by the sanitizer
//!   and out-of-range quantity updates are ignored; neither is an error.
//! - **Storage failures are absorbed**: the in-memory list stays
//!   authoritative and the failure is logged.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::money::Money;
use crate::persistence::{encode_items, load_items, CartSlot};
use crate::sanitize::sanitize_candidate;
use crate::types::{CartTotals, LineItem, LineItemId, TicketCandidate};
use crate::{MAX_TICKETS_PER_ITEM, MIN_TICKETS_PER_ITEM};

// =============================================================================
// Cart Store
// =============================================================================

/// Line items backed by a durable storage slot.
#[derive(Debug)]
pub struct CartStore<S: CartSlot> {
    items: Vec<LineItem>,
    slot: S,
}

impl<S: CartSlot> CartStore<S> {
    /// Builds a cart from whatever the slot holds.
    ///
    /// A missing, unreadable or malformed slot yields an empty cart.
    pub fn hydrate(slot: S) -> Self {
        let items = load_items(&slot);
        debug!(items = items.len(), "Cart hydrated");
        CartStore { items, slot }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Sanitizes and appends a candidate.
    ///
    /// `None` is the "nothing to add" case and leaves the cart untouched.
    pub fn add(&mut self, candidate: Option<TicketCandidate>) -> Option<LineItemId> {
        let candidate = candidate?;
        let item = sanitize_candidate(&candidate);
        let id = item.id();

        info!(
            item_id = %id,
            tickets = item.ticket_count(),
            total = %item.total_price(),
            "Line item added"
        );
        self.items.push(item);
        self.persist();
        Some(id)
    }

    /// Adds a candidate given as raw JSON. `null` and non-objects are no-ops.
    pub fn add_json(&mut self, raw: &Value) -> Option<LineItemId> {
        self.add(TicketCandidate::from_json(raw))
    }

    /// Drops the item with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: LineItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;

        if removed {
            info!(item_id = %id, "Line item removed");
            self.persist();
        } else {
            debug!(item_id = %id, "Remove ignored, no such item");
        }
        removed
    }

    /// Sets the ticket count of one item.
    ///
    /// Ignored (returns `false`) when `count` is outside 1..=20 or no item
    /// has `id`.
    pub fn update_quantity(&mut self, id: LineItemId, count: i64) -> bool {
        let range = MIN_TICKETS_PER_ITEM as i64..=MAX_TICKETS_PER_ITEM as i64;
        if !range.contains(&count) {
            debug!(item_id = %id, count, "Quantity update ignored, out of range");
            return false;
        }

        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            debug!(item_id = %id, "Quantity update ignored, no such item");
            return false;
        };

        item.set_ticket_count(count as u32);
        info!(item_id = %id, count, "Quantity updated");
        self.persist();
        true
    }

    /// Empties the cart and removes the storage key.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.slot.remove() {
            warn!(error = %e, "Failed to remove cart slot");
        }
        info!("Cart cleared");
    }

    fn persist(&mut self) {
        let result = encode_items(&self.items).and_then(|raw| self.slot.write(&raw));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart, keeping in-memory state");
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Owned copy of the items, for handing to an in-flight submission.
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of ticket counts.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| item.ticket_count() as u64).sum()
    }

    /// Sum of line totals.
    pub fn grand_total(&self) -> Money {
        self.items.iter().map(LineItem::total_price).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            line_count: self.items.len(),
            item_count: self.item_count(),
            grand_total: self.grand_total(),
        }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Hands the slot back, e.g. to hydrate a fresh store from it.
    pub fn into_slot(self) -> S {
        self.slot
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlotError;
    use crate::money::MAX_UNIT_PRICE;
    use crate::persistence::MemorySlot;
    use serde_json::json;

    fn candidate(tickets: i64, price: i64) -> Option<TicketCandidate> {
        Some(TicketCandidate::new(tickets, price))
    }

    fn expected_total<S: CartSlot>(cart: &CartStore<S>) -> Money {
        cart.items()
            .iter()
            .map(|i| i.unit_price().multiply_quantity(i.ticket_count()))
            .sum()
    }

    /// Slot whose every operation fails.
    struct BrokenSlot;

    impl CartSlot for BrokenSlot {
        fn read(&self) -> Result<Option<String>, SlotError> {
            Err(SlotError::Unavailable("disk gone".into()))
        }
        fn write(&mut self, _raw: &str) -> Result<(), SlotError> {
            Err(SlotError::Unavailable("disk gone".into()))
        }
        fn remove(&mut self) -> Result<(), SlotError> {
            Err(SlotError::Unavailable("disk gone".into()))
        }
    }

    #[test]
    fn test_add_json_extreme_price_is_capped() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        cart.add_json(&json!({ "ticketCount": 20, "unitPrice": 1e16 }));
        cart.add_json(&json!({ "ticketCount": 20, "unitPrice": 1e17 }));

        assert_eq!(cart.len(), 2);
        for item in cart.items() {
            assert_eq!(item.unit_price(), MAX_UNIT_PRICE);
        }
        assert_eq!(cart.grand_total(), Money::from_minor(i64::MAX));
    }

    #[test]
    fn test_add_json_with_legacy_and_current_names() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        let id = cart
            .add_json(&json!({ "tickets": 2, "ticketCount": 3, "unitPrice": 10 }))
            .unwrap();
        assert_eq!(cart.get(id).unwrap().ticket_count(), 3);
        assert_eq!(cart.grand_total(), Money::from_major(30));
    }
    #[test]
    fn test_add_clamps_and_totals() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        cart.add_json(&json!({ "ticketCount": 25, "unitPrice": 100 }));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].ticket_count(), 20);
        assert_eq!(cart.items()[0].total_price(), Money::from_major(2000));
        assert_eq!(cart.item_count(), 20);
    }

    #[test]
    fn test_add_none_is_noop() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        assert!(cart.add(None).is_none());
        assert!(cart.add_json(&Value::Null).is_none());
        assert!(cart.add_json(&json!("string")).is_none());
        assert!(cart.is_empty());
        assert!(cart.slot().contents().is_none());
    }

    #[test]
    fn test_identical_adds_stay_distinct() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        let a = cart.add(candidate(2, 50)).unwrap();
        let b = cart.add(candidate(2, 50)).unwrap();

        assert_ne!(a, b);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_remove() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        let a = cart.add(candidate(1, 10)).unwrap();
        let b = cart.add(candidate(3, 10)).unwrap();

        assert!(cart.remove(a));
        assert!(!cart.remove(a));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id(), b);
        assert_eq!(cart.grand_total(), Money::from_major(30));
    }

    #[test]
    fn test_update_quantity_bounds() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        let id = cart.add(candidate(2, 100)).unwrap();

        for bad in [0, -1, 21, 1000] {
            assert!(!cart.update_quantity(id, bad));
            assert_eq!(cart.get(id).unwrap().ticket_count(), 2);
        }
        assert!(!cart.update_quantity(LineItemId::generate(), 5));

        assert!(cart.update_quantity(id, 7));
        let item = cart.get(id).unwrap();
        assert_eq!(item.ticket_count(), 7);
        assert_eq!(item.total_price(), Money::from_major(700));
    }

    #[test]
    fn test_grand_total_tracks_every_mutation() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        let mut ids = Vec::new();

        for (step, (tickets, price)) in [(1, 6499), (25, 10), (3, 0), (4, 1250), (0, 7)]
            .into_iter()
            .enumerate()
        {
            ids.push(cart.add(candidate(tickets, price)).unwrap());
            assert_eq!(cart.grand_total(), expected_total(&cart));

            cart.update_quantity(ids[step / 2], (step as i64 * 7) % 23);
            assert_eq!(cart.grand_total(), expected_total(&cart));

            if step % 2 == 1 {
                cart.remove(ids[step - 1]);
                assert_eq!(cart.grand_total(), expected_total(&cart));
            }
        }
    }

    #[test]
    fn test_every_mutation_persists() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        let id = cart.add(candidate(2, 10)).unwrap();
        cart.update_quantity(id, 5);
        cart.add(candidate(1, 1));

        let reloaded = CartStore::hydrate(cart.into_slot());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(id).unwrap().ticket_count(), 5);
        assert_eq!(reloaded.grand_total(), Money::from_major(51));
    }

    #[test]
    fn test_clear_then_reload_is_empty() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        cart.add(candidate(2, 10));
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.slot().contents().is_none());

        let reloaded = CartStore::hydrate(cart.into_slot());
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_corrupt_slot_hydrates_empty() {
        let cart = CartStore::hydrate(MemorySlot::with_contents("[{\"id\":1}]"));
        assert!(cart.is_empty());
        assert_eq!(cart.grand_total(), Money::zero());
    }

    #[test]
    fn test_broken_slot_never_fails_the_cart() {
        let mut cart = CartStore::hydrate(BrokenSlot);
        let id = cart.add(candidate(3, 10)).unwrap();
        assert!(cart.update_quantity(id, 4));
        assert_eq!(cart.grand_total(), Money::from_major(40));

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = CartStore::hydrate(MemorySlot::new());
        cart.add(candidate(2, 6499));
        cart.add(candidate(1, 6499));

        let totals = cart.totals();
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.grand_total, Money::from_major(19497));
    }
}
