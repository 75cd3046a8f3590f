//! # Persistence Adapter
//!
//! Durable storage of the cart between sessions.
//!
//! ## Load / Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   hydrate                                   every mutation              │
//! │                                                                         │
//! │   slot.read()                               encode_items(items)         │
//! │      │                                           │                      │
//! │      ├─ None ─────────────► []                   ▼                      │
//! │      ├─ Err ──── warn ────► []              slot.write(raw)             │
//! │      └─ Some(raw)                                │                      │
//! │            │                                     └─ Err ── warn         │
//! │            ▼                                                            │
//! │      decode_items(raw)                      clear                       │
//! │        ├─ not JSON ─ warn ─► []                 │                       │
//! │        ├─ not array ─ warn ─► []                ▼                       │
//! │        ├─ any bad item ─ warn ─► []         slot.remove()               │
//! │        └─ ok ───────────────► items                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A damaged slot never yields a partial cart: one bad element empties the
//! whole load.

use tracing::warn;

use crate::error::SlotError;
use crate::types::LineItem;

// =============================================================================
// Storage Slot
// =============================================================================

/// A single named key in some durable key-value store.
pub trait CartSlot {
    /// Current raw value, `None` when the key is absent.
    fn read(&self) -> Result<Option<String>, SlotError>;

    /// Replaces the stored value.
    fn write(&mut self, raw: &str) -> Result<(), SlotError>;

    /// Deletes the key entirely.
    fn remove(&mut self) -> Result<(), SlotError>;
}

impl<S: CartSlot + ?Sized> CartSlot for Box<S> {
    fn read(&self) -> Result<Option<String>, SlotError> {
        (**self).read()
    }

    fn write(&mut self, raw: &str) -> Result<(), SlotError> {
        (**self).write(raw)
    }

    fn remove(&mut self) -> Result<(), SlotError> {
        (**self).remove()
    }
}

/// In-process slot. Lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Option<String>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already holds `raw`, as if written by an earlier session.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        MemorySlot {
            value: Some(raw.into()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl CartSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        Ok(self.value.clone())
    }

    fn write(&mut self, raw: &str) -> Result<(), SlotError> {
        self.value = Some(raw.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<(), SlotError> {
        self.value = None;
        Ok(())
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Decodes a stored cart, falling back to empty on any corruption.
pub fn decode_items(raw: &str) -> Vec<LineItem> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Stored cart is not valid JSON, starting empty");
            return Vec::new();
        }
    };

    if !value.is_array() {
        warn!("Stored cart is not a sequence, starting empty");
        return Vec::new();
    }

    match serde_json::from_value::<Vec<LineItem>>(value) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Stored cart has a malformed item, starting empty");
            Vec::new()
        }
    }
}

pub fn encode_items(items: &[LineItem]) -> Result<String, SlotError> {
    serde_json::to_string(items).map_err(|e| SlotError::Encode(e.to_string()))
}

/// Reads and decodes whatever the slot holds.
pub fn load_items<S: CartSlot + ?Sized>(slot: &S) -> Vec<LineItem> {
    match slot.read() {
        Ok(Some(raw)) => decode_items(&raw),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "Cart slot unreadable, starting empty");
            Vec::new()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
