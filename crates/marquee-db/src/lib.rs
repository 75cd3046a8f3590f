//! # marquee-db: Database Layer for Marquee
//!
//! Server-side storage for the Marquee site, on SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Marquee Server Data Flow                         │
//! │                                                                         │
//! │  POST /api/payments/submit-manual                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     marquee-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ PaymentRepo   │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ ContactRepo   │    │              │  │   │
//! │  │   │               │    │ NewsletterRepo│    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (MARQUEE_DB_PATH)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart itself never reaches this crate: it lives in the client session.
//! Only submitted orders are recorded.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marquee_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("marquee.db")).await?;
//! let added = db.newsletter().subscribe("ada@example.com").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::contact::ContactRepository;
pub use repository::newsletter::NewsletterRepository;
pub use repository::payment::{NewPayment, PaymentRecord, PaymentRepository};
