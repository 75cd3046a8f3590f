//! # Payment Repository
//!
//! Ledger of manual (bank transfer) payment submissions.
//!
//! ## Submission Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. RECEIVED                                                            │
//! │     └── insert() → PaymentRecord { notified_at: None }                 │
//! │                                                                         │
//! │  2. NOTIFIED (at least one admin channel delivered)                    │
//! │     └── mark_notified() → notified_at = now                            │
//! │                                                                         │
//! │  Confirmation of the transfer itself happens outside the system.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use marquee_core::validation::parse_order_details;
use marquee_core::{CoreResult, LineItem, Money};

use crate::error::{DbError, DbResult};

/// Everything needed to record an accepted submission.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub items: Vec<LineItem>,
    pub grand_total: Money,
    pub summary: String,
    /// Where the receipt was stored, relative to the receipts directory.
    pub receipt_path: String,
    pub receipt_content_type: String,
    pub receipt_size: u64,
    pub client_ip: Option<String>,
}

/// A stored submission.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: String,
    pub grand_total_minor: i64,
    pub ticket_count: i64,
    pub line_count: i64,
    pub buyer_email: String,
    /// JSON array of line items.
    pub order_details: String,
    pub summary: String,
    pub receipt_path: String,
    pub receipt_content_type: String,
    pub receipt_size: i64,
    pub client_ip: Option<String>,
    pub notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn grand_total(&self) -> Money {
        Money::from_minor(self.grand_total_minor)
    }

    /// Decodes the stored order.
    pub fn items(&self) -> CoreResult<Vec<LineItem>> {
        parse_order_details(&self.order_details)
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, grand_total_minor, ticket_count, line_count, buyer_email,
        order_details, summary, receipt_path, receipt_content_type,
        receipt_size, client_ip, notified_at, created_at
    FROM payments
"#;

/// Repository for payment submissions.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Records a submission and returns the stored row.
    pub async fn insert(&self, payment: NewPayment) -> DbResult<PaymentRecord> {
        let record = PaymentRecord {
            id: Uuid::new_v4().to_string(),
            grand_total_minor: payment.grand_total.minor(),
            ticket_count: payment.items.iter().map(|i| i.ticket_count() as i64).sum(),
            line_count: payment.items.len() as i64,
            buyer_email: payment
                .items
                .first()
                .map(|i| i.contact().email.clone())
                .unwrap_or_default(),
            order_details: serde_json::to_string(&payment.items)?,
            summary: payment.summary,
            receipt_path: payment.receipt_path,
            receipt_content_type: payment.receipt_content_type,
            receipt_size: i64::try_from(payment.receipt_size).unwrap_or(i64::MAX),
            client_ip: payment.client_ip,
            notified_at: None,
            created_at: Utc::now(),
        };

        debug!(
            id = %record.id,
            total = %record.grand_total(),
            tickets = record.ticket_count,
            "Inserting payment submission"
        );

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, grand_total_minor, ticket_count, line_count, buyer_email,
                order_details, summary, receipt_path, receipt_content_type,
                receipt_size, client_ip, notified_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&record.id)
        .bind(record.grand_total_minor)
        .bind(record.ticket_count)
        .bind(record.line_count)
        .bind(&record.buyer_email)
        .bind(&record.order_details)
        .bind(&record.summary)
        .bind(&record.receipt_path)
        .bind(&record.receipt_content_type)
        .bind(record.receipt_size)
        .bind(&record.client_ip)
        .bind(record.notified_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PaymentRecord>> {
        let record = sqlx::query_as::<_, PaymentRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Newest submissions first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<PaymentRecord>> {
        let records = sqlx::query_as::<_, PaymentRecord>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Stamps the submission as delivered to the admin.
    pub async fn mark_notified(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE payments SET notified_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Database;
    use marquee_core::sanitize::sanitize_candidate;
    use marquee_core::{ContactDetails, TicketCandidate};

    fn new_payment() -> NewPayment {
        let contact = ContactDetails {
            email: "ada@example.com".into(),
            ..Default::default()
        };
        let items = vec![
            sanitize_candidate(&TicketCandidate::new(2, 6499).with_contact(&contact)),
            sanitize_candidate(&TicketCandidate::new(1, 6499)),
        ];
        NewPayment {
            grand_total: items.iter().map(LineItem::total_price).sum(),
            items,
            summary: "summary".into(),
            receipt_path: "1700000000000_receipt.png".into(),
            receipt_content_type: "image/png".into(),
            receipt_size: 2048,
            client_ip: Some("127.0.0.1".into()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.payments();

        let payment = new_payment();
        let items = payment.items.clone();
        let record = repo.insert(payment).await.unwrap();

        assert_eq!(record.grand_total(), Money::from_major(19497));
        assert_eq!(record.ticket_count, 3);
        assert_eq!(record.line_count, 2);
        assert_eq!(record.buyer_email, "ada@example.com");
        assert!(record.notified_at.is_none());

        let fetched = repo.get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.items().unwrap(), items);
        assert_eq!(fetched.receipt_size, 2048);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.payments();

        let first = repo.insert(new_payment()).await.unwrap();
        let second = repo.insert(new_payment()).await.unwrap();
        let third = repo.insert(new_payment()).await.unwrap();

        let recent = repo.list_recent(2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, [third.id.as_str(), second.id.as_str()]);
        assert_ne!(first.id, third.id);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_mark_notified() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.payments();
        let record = repo.insert(new_payment()).await.unwrap();

        repo.mark_notified(&record.id).await.unwrap();
        let fetched = repo.get_by_id(&record.id).await.unwrap().unwrap();
        assert!(fetched.notified_at.is_some());

        assert!(matches!(
            repo.mark_notified("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_positive_total_rejected() {
        let db = Database::in_memory().await.unwrap();
        let mut payment = new_payment();
        payment.grand_total = Money::zero();

        assert!(matches!(
            db.payments().insert(payment).await,
            Err(DbError::ConstraintViolation(_))
        ));
    }
}
