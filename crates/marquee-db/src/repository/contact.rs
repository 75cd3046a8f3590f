//! Contact form messages.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use marquee_core::ContactMessage;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ContactRepository { pool }
    }

    /// Stores a message and returns its id.
    pub async fn insert(&self, message: &ContactMessage) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        debug!(id = %id, email = %message.email, "Inserting contact message");

        sqlx::query(
            r#"
            INSERT INTO contact_messages (id, first_name, last_name, email, message, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&message.first_name)
        .bind(&message.last_name)
        .bind(&message.email)
        .bind(&message.message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
