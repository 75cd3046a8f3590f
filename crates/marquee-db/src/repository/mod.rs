//! # Repository Module
//!
//! Database repository implementations for the Marquee server.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request handler                                                        │
//! │       │                                                                 │
//! │       │  db.payments().insert(new_payment)                             │
//! │       ▼                                                                 │
//! │  PaymentRepository                                                     │
//! │  ├── insert(&self, payment)                                            │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_recent(&self, limit)                                         │
//! │  └── mark_notified(&self, id)                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PaymentRepository`](payment::PaymentRepository) - Manual payment ledger
//! - [`ContactRepository`](contact::ContactRepository) - Contact form messages
//! - [`NewsletterRepository`](newsletter::NewsletterRepository) - Subscribers

pub mod contact;
pub mod newsletter;
pub mod payment;
