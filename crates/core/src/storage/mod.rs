use crate::domain::finance::{Forecast, Report, Sentiment};
use crate::domain::user::UserRecord;
use anyhow::{Context, Result};
use uuid::Uuid;

pub mod forecasts;
pub mod reports;
pub mod sentiments;
pub mod users;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use forecasts::PgForecastStore;
pub use reports::PgReportStore;
pub use sentiments::PgSentimentStore;
pub use users::PgUserStore;

pub async fn migrate(pool: &sqlx::PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Atomic insert. Returns `false` when a record with the same email
    /// already exists; the existing record is left untouched.
    async fn insert(&self, user: &UserRecord) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait ReportStore: Send + Sync {
    /// Atomic insert. Returns `false` when a report with the same
    /// (email, report_name) pair already exists.
    async fn insert(&self, report: &Report) -> Result<bool>;

    async fn find_all(&self, email: &str) -> Result<Vec<Report>>;

    async fn find_one(&self, email: &str, report_name: &str) -> Result<Option<Report>>;
}

#[async_trait::async_trait]
pub trait ForecastStore: Send + Sync {
    /// Always inserts; forecasts accumulate per (email, ticker).
    async fn insert(&self, forecast: &Forecast) -> Result<Uuid>;

    async fn find_by_user_email(&self, email: &str) -> Result<Vec<Forecast>>;
}

#[async_trait::async_trait]
pub trait SentimentStore: Send + Sync {
    async fn insert(&self, sentiment: &Sentiment) -> Result<()>;
}
