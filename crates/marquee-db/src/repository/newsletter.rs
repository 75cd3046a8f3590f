//! Newsletter subscribers, keyed by email address.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct NewsletterRepository {
    pool: SqlitePool,
}

impl NewsletterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NewsletterRepository { pool }
    }

    /// Adds `email`. Returns `false` when it was already subscribed.
    pub async fn subscribe(&self, email: &str) -> DbResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO newsletter_subscribers (email, created_at) VALUES (?1, ?2)",
        )
        .bind(email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() == 1;
        debug!(email, added, "Newsletter subscribe");
        Ok(added)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_subscribers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Database;

    #[tokio::test]
    async fn test_subscribe_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.newsletter();

        assert!(repo.subscribe("ada@example.com").await.unwrap());
        assert!(!repo.subscribe("ada@example.com").await.unwrap());
        assert!(repo.subscribe("grace@example.com").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
