use crate::domain::finance::Sentiment;
use crate::storage::SentimentStore;
use anyhow::{Context, Result};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgSentimentStore {
    pool: sqlx::PgPool,
}

impl PgSentimentStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SentimentStore for PgSentimentStore {
    async fn insert(&self, sentiment: &Sentiment) -> Result<()> {
        sqlx::query(
            "INSERT INTO sentiments (id, email, body, sentiment, confidence, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(&sentiment.email)
        .bind(&sentiment.text)
        .bind(&sentiment.sentiment)
        .bind(sentiment.confidence)
        .bind(sentiment.timestamp)
        .execute(&self.pool)
        .await
        .context("insert sentiments failed")?;

        Ok(())
    }
}
