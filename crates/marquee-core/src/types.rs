//! # Domain Types
//!
//! Core domain types used throughout Marquee.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐  sanitize   ┌──────────────────┐                 │
//! │  │ TicketCandidate  │ ──────────► │    LineItem      │                 │
//! │  │ ──────────────── │             │ ──────────────── │                 │
//! │  │ anything goes    │             │ id (UUID v4)     │                 │
//! │  │ (raw form/JSON)  │             │ ticket_count 1-20│                 │
//! │  └──────────────────┘             │ unit_price       │                 │
//! │                                   │ total_price ◄──── derived          │
//! │                                   │ contact          │                 │
//! │                                   └──────────────────┘                 │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │ ContactDetails   │   │  ContactMessage  │   │   CartTotals     │    │
//! │  │ buyer fields     │   │  contact form    │   │   derived view   │    │
//! │  └──────────────────┘   └──────────────────┘   └──────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! A line item serializes flat, in camelCase, with money in minor units:
//! ```json
//! { "id": "…", "ticketCount": 2, "unitPriceMinor": 649900,
//!   "totalPriceMinor": 1299800, "firstName": "Ada", … }
//! ```
//! Deserialization re-validates the shape and recomputes the total; a stored
//! `totalPriceMinor` is never trusted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;
use crate::money::{Money, MAX_UNIT_PRICE};
use crate::{MAX_TICKETS_PER_ITEM, MIN_TICKETS_PER_ITEM};

// =============================================================================
// Line Item Id
// =============================================================================

/// Opaque, immutable identity of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        LineItemId(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(LineItemId)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Contact Details
// =============================================================================

/// Free-text buyer details attached to a line item.
///
/// Trimmed by the sanitizer and otherwise unchecked; form validation happens
/// before a candidate is built (see [`crate::validation::validate_buyer`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    /// Alternate contact handle (WhatsApp number).
    pub whatsapp: String,
}

impl ContactDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One ticket purchase intent.
///
/// ## Invariants
/// - `id` is assigned once at creation and never changes
/// - `ticket_count` is always within 1..=20
/// - `total_price == unit_price × ticket_count` at all times; the only
///   mutator ([`LineItem::set_ticket_count`]) recomputes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord", into = "LineItemRecord")]
pub struct LineItem {
    id: LineItemId,
    ticket_count: u32,
    unit_price: Money,
    total_price: Money,
    contact: ContactDetails,
}

impl LineItem {
    /// Creates a line item from already-clamped values with a fresh id.
    pub(crate) fn new(ticket_count: u32, unit_price: Money, contact: ContactDetails) -> Self {
        LineItem {
            id: LineItemId::generate(),
            ticket_count,
            unit_price,
            total_price: unit_price.multiply_quantity(ticket_count),
            contact,
        }
    }

    pub fn id(&self) -> LineItemId {
        self.id
    }

    pub fn ticket_count(&self) -> u32 {
        self.ticket_count
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Replaces the ticket count and recomputes the total.
    ///
    /// Returns `false` (and leaves the item untouched) when `count` falls
    /// outside 1..=20.
    pub fn set_ticket_count(&mut self, count: u32) -> bool {
        if !(MIN_TICKETS_PER_ITEM..=MAX_TICKETS_PER_ITEM).contains(&count) {
            return false;
        }
        self.ticket_count = count;
        self.total_price = self.unit_price.multiply_quantity(count);
        true
    }
}

/// Serialized form of a [`LineItem`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, rename = "LineItem")]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    pub id: String,
    pub ticket_count: i64,
    pub unit_price_minor: i64,
    #[serde(default)]
    pub total_price_minor: Option<i64>,
    #[serde(flatten)]
    pub contact: ContactDetails,
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = CoreError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        let id = LineItemId::parse(&record.id)
            .ok_or_else(|| CoreError::InvalidLineItem(format!("bad id '{}'", record.id)))?;

        let range = MIN_TICKETS_PER_ITEM as i64..=MAX_TICKETS_PER_ITEM as i64;
        if !range.contains(&record.ticket_count) {
            return Err(CoreError::InvalidLineItem(format!(
                "ticketCount {} outside {}..={}",
                record.ticket_count, MIN_TICKETS_PER_ITEM, MAX_TICKETS_PER_ITEM
            )));
        }

        if record.unit_price_minor < 0 {
            return Err(CoreError::InvalidLineItem(format!(
                "negative unitPriceMinor {}",
                record.unit_price_minor
            )));
        }

        if record.unit_price_minor > MAX_UNIT_PRICE.minor() {
            return Err(CoreError::InvalidLineItem(format!(
                "unitPriceMinor {} above {}",
                record.unit_price_minor,
                MAX_UNIT_PRICE.minor()
            )));
        }

        let ticket_count = record.ticket_count as u32;
        let unit_price = Money::from_minor(record.unit_price_minor);
        let total_price = unit_price
            .checked_mul_quantity(ticket_count)
            .ok_or_else(|| CoreError::InvalidLineItem("line total overflows".to_string()))?;
        Ok(LineItem {
            id,
            ticket_count,
            unit_price,
            total_price,
            contact: record.contact,
        })
    }
}

impl From<LineItem> for LineItemRecord {
    fn from(item: LineItem) -> Self {
        LineItemRecord {
            id: item.id.to_string(),
            ticket_count: item.ticket_count as i64,
            unit_price_minor: item.unit_price.minor(),
            total_price_minor: Some(item.total_price.minor()),
            contact: item.contact,
        }
    }
}

// =============================================================================
// Ticket Candidate
// =============================================================================

/// Raw, untrusted input for a new line item.
///
/// Every field is an arbitrary JSON value so that whatever the form posted
/// (numbers, numeric strings, garbage, nothing at all) reaches the sanitizer
/// intact. `unitPrice` is in major units. The legacy field names `tickets`
/// and `ticketPrice` are read when the current name is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketCandidate {
    pub ticket_count: Value,
    pub unit_price: Value,
    pub first_name: Value,
    pub last_name: Value,
    pub email: Value,
    pub phone: Value,
    pub location: Value,
    pub whatsapp: Value,
}

impl TicketCandidate {
    /// Builds a candidate from ticket count and major-unit price.
    pub fn new(ticket_count: impl Into<Value>, unit_price: impl Into<Value>) -> Self {
        TicketCandidate {
            ticket_count: ticket_count.into(),
            unit_price: unit_price.into(),
            ..Default::default()
        }
    }

    /// Attaches buyer details.
    pub fn with_contact(mut self, contact: &ContactDetails) -> Self {
        self.first_name = Value::from(contact.first_name.as_str());
        self.last_name = Value::from(contact.last_name.as_str());
        self.email = Value::from(contact.email.as_str());
        self.phone = Value::from(contact.phone.as_str());
        self.location = Value::from(contact.location.as_str());
        self.whatsapp = Value::from(contact.whatsapp.as_str());
        self
    }

    /// Reads a candidate out of an arbitrary JSON value.
    ///
    /// Returns `None` for `null` and every non-object value: that is the
    /// "no candidate at all" case.
    pub fn from_json(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        let field = |name: &str| fields.get(name).cloned().unwrap_or(Value::Null);
        let either = |name: &str, legacy: &str| {
            fields
                .get(name)
                .or_else(|| fields.get(legacy))
                .cloned()
                .unwrap_or(Value::Null)
        };

        Some(TicketCandidate {
            ticket_count: either("ticketCount", "tickets"),
            unit_price: either("unitPrice", "ticketPrice"),
            first_name: field("firstName"),
            last_name: field("lastName"),
            email: field("email"),
            phone: field("phone"),
            location: field("location"),
            whatsapp: field("whatsapp"),
        })
    }
}

// =============================================================================
// Contact Message
// =============================================================================

/// Contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Derived cart figures, computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Number of line items.
    pub line_count: usize,
    /// Sum of ticket counts.
    pub item_count: u64,
    /// Sum of line totals.
    pub grand_total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
