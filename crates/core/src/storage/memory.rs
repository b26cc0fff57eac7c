//! In-memory store implementations backing the service- and handler-level
//! tests (the latter via the `test-util` feature).

use crate::domain::finance::{Forecast, Report, Sentiment};
use crate::domain::user::UserRecord;
use crate::storage::{ForecastStore, ReportStore, SentimentStore, UserStore};
use anyhow::Result;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<UserRecord>>,
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &UserRecord) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        rows.push(user.clone());
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct MemoryReportStore {
    rows: Mutex<Vec<Report>>,
}

#[async_trait::async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: &Report) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.email == report.email && r.report_name == report.report_name)
        {
            return Ok(false);
        }
        rows.push(report.clone());
        Ok(true)
    }

    async fn find_all(&self, email: &str) -> Result<Vec<Report>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|r| r.email == email).cloned().collect())
    }

    async fn find_one(&self, email: &str, report_name: &str) -> Result<Option<Report>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.email == email && r.report_name == report_name)
            .cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryForecastStore {
    rows: Mutex<Vec<(Uuid, Forecast)>>,
}

#[async_trait::async_trait]
impl ForecastStore for MemoryForecastStore {
    async fn insert(&self, forecast: &Forecast) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push((id, forecast.clone()));
        Ok(id)
    }

    async fn find_by_user_email(&self, email: &str) -> Result<Vec<Forecast>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(_, f)| f.user_email == email)
            .map(|(_, f)| f.clone())
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct MemorySentimentStore {
    rows: Mutex<Vec<Sentiment>>,
}

impl MemorySentimentStore {
    pub fn all(&self) -> Vec<Sentiment> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SentimentStore for MemorySentimentStore {
    async fn insert(&self, sentiment: &Sentiment) -> Result<()> {
        self.rows.lock().unwrap().push(sentiment.clone());
        Ok(())
    }
}
