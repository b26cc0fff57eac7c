use crate::domain::finance::{Forecast, Prediction};
use crate::storage::ForecastStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgForecastStore {
    pool: sqlx::PgPool,
}

impl PgForecastStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ForecastStore for PgForecastStore {
    async fn insert(&self, forecast: &Forecast) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let predictions =
            serde_json::to_value(&forecast.predictions).context("serialize predictions failed")?;

        sqlx::query(
            "INSERT INTO forecasts (id, user_email, ticker, forecast_period_days, predictions, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&forecast.user_email)
        .bind(&forecast.ticker)
        .bind(forecast.forecast_period_days)
        .bind(predictions)
        .bind(forecast.timestamp)
        .execute(&self.pool)
        .await
        .context("insert forecasts failed")?;

        Ok(id)
    }

    async fn find_by_user_email(&self, email: &str) -> Result<Vec<Forecast>> {
        let rows = sqlx::query_as::<_, (String, String, Option<i32>, Value, DateTime<Utc>)>(
            "SELECT user_email, ticker, forecast_period_days, predictions, recorded_at \
             FROM forecasts WHERE user_email = $1",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .context("select forecasts failed")?;

        let mut out = Vec::with_capacity(rows.len());
        for (user_email, ticker, forecast_period_days, predictions, recorded_at) in rows {
            let predictions: Vec<Prediction> = serde_json::from_value(predictions)
                .with_context(|| format!("invalid predictions in DB for user_email={user_email}"))?;
            out.push(Forecast {
                user_email,
                ticker,
                forecast_period_days,
                predictions,
                timestamp: recorded_at,
            });
        }
        Ok(out)
    }
}
