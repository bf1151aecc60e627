use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::{Article, Digest};

/// One digest per calendar day.
#[async_trait]
pub trait DigestStore: Send + Sync {
    /// Write `digest` under its date, replacing any digest already stored for that day.
    async fn save_digest(&self, digest: &Digest) -> Result<(), sqlx::Error>;
    /// The digest with the greatest date, if any.
    async fn latest_digest(&self) -> Result<Option<Digest>, sqlx::Error>;
}

#[async_trait]
impl DigestStore for SqlitePool {
    async fn save_digest(&self, digest: &Digest) -> Result<(), sqlx::Error> {
        let articles =
            serde_json::to_string(&digest.articles).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            r#"
            INSERT INTO daily_summaries (date, articles, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                articles = excluded.articles,
                created_at = excluded.created_at
            "#,
        )
        .bind(digest.date)
        .bind(articles)
        .bind(Utc::now())
        .execute(self)
        .await?;

        Ok(())
    }

    async fn latest_digest(&self) -> Result<Option<Digest>, sqlx::Error> {
        let row: Option<(NaiveDate, String)> =
            sqlx::query_as("SELECT date, articles FROM daily_summaries ORDER BY date DESC LIMIT 1")
                .fetch_optional(self)
                .await?;

        row.map(|(date, articles)| {
            let articles: Vec<Article> =
                serde_json::from_str(&articles).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            Ok(Digest { date, articles })
        })
        .transpose()
    }
}
