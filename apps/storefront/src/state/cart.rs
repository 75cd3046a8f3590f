//! # Cart State
//!
//! The session's [`CartStore`] behind `Arc<Mutex<_>>`.
//!
//! A poisoned lock is recovered rather than propagated: every store
//! operation leaves the item list consistent before it can panic.

use std::sync::{Arc, Mutex, PoisonError};

use marquee_core::cart::CartStore;
use marquee_core::persistence::CartSlot;

/// Storage slot type the session holds.
pub type SessionSlot = Box<dyn CartSlot + Send>;

#[derive(Clone)]
pub struct CartState {
    cart: Arc<Mutex<CartStore<SessionSlot>>>,
}

impl CartState {
    /// Hydrates the cart from `slot`.
    pub fn new(slot: SessionSlot) -> Self {
        CartState {
            cart: Arc::new(Mutex::new(CartStore::hydrate(slot))),
        }
    }

    /// Executes a read-only function on the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartStore<SessionSlot>) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a mutating function on the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartStore<SessionSlot>) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::persistence::MemorySlot;
    use marquee_core::TicketCandidate;

    #[test]
    fn test_clones_share_the_cart() {
        let state = CartState::new(Box::new(MemorySlot::new()));
        let other = state.clone();

        state.with_cart_mut(|c| c.add(Some(TicketCandidate::new(2, 100))));
        assert_eq!(other.with_cart(|c| c.item_count()), 2);
    }
}
