use crate::domain::finance::Report;
use crate::storage::ReportStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgReportStore {
    pool: sqlx::PgPool,
}

impl PgReportStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

type ReportRow = (String, String, String, DateTime<Utc>);

fn into_report((email, report_name, summary, recorded_at): ReportRow) -> Report {
    Report {
        email,
        report_name,
        summary,
        timestamp: recorded_at,
    }
}

#[async_trait::async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: &Report) -> Result<bool> {
        let res = sqlx::query(
            "INSERT INTO financial_reports (id, email, report_name, summary, recorded_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email, report_name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&report.email)
        .bind(&report.report_name)
        .bind(&report.summary)
        .bind(report.timestamp)
        .execute(&self.pool)
        .await
        .context("insert financial_reports failed")?;

        Ok(res.rows_affected() == 1)
    }

    async fn find_all(&self, email: &str) -> Result<Vec<Report>> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT email, report_name, summary, recorded_at \
             FROM financial_reports WHERE email = $1",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .context("select financial_reports failed")?;

        Ok(rows.into_iter().map(into_report).collect())
    }

    async fn find_one(&self, email: &str, report_name: &str) -> Result<Option<Report>> {
        let row = sqlx::query_as::<_, ReportRow>(
            "SELECT email, report_name, summary, recorded_at \
             FROM financial_reports WHERE email = $1 AND report_name = $2",
        )
        .bind(email)
        .bind(report_name)
        .fetch_optional(&self.pool)
        .await
        .context("select financial_reports failed")?;

        Ok(row.map(into_report))
    }
}
