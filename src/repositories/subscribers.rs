use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::Subscriber;

/// Subscriber registry.
///
/// There is no uniqueness constraint underneath: callers check
/// [`SubscriberRegistry::exists`] before [`SubscriberRegistry::add`], and two
/// concurrent signups for the same address may both be inserted.
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    async fn exists(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn add(&self, email: &str, at: DateTime<Utc>) -> Result<Subscriber, sqlx::Error>;
    /// Delete every record for `email` in one transaction, returning how many went.
    async fn remove(&self, email: &str) -> Result<u64, sqlx::Error>;
    async fn list(&self) -> Result<Vec<Subscriber>, sqlx::Error>;
}

#[async_trait]
impl SubscriberRegistry for SqlitePool {
    async fn exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscribers WHERE email = ?")
            .bind(email)
            .fetch_one(self)
            .await?;
        Ok(count > 0)
    }

    async fn add(&self, email: &str, at: DateTime<Utc>) -> Result<Subscriber, sqlx::Error> {
        sqlx::query("INSERT INTO subscribers (email, subscribed_at) VALUES (?, ?)")
            .bind(email)
            .bind(at)
            .execute(self)
            .await?;

        Ok(Subscriber {
            email: email.to_string(),
            subscribed_at: at,
        })
    }

    async fn remove(&self, email: &str) -> Result<u64, sqlx::Error> {
        let mut tx = self.begin().await?;
        let result = sqlx::query("DELETE FROM subscribers WHERE email = ?")
            .bind(email)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn list(&self) -> Result<Vec<Subscriber>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(
            "SELECT email, subscribed_at FROM subscribers ORDER BY id ASC",
        )
        .fetch_all(self)
        .await
    }
}
