use crate::domain::finance::{Forecast, Report, SaveForecastRequest, Sentiment};
use crate::error::Error;
use crate::storage::{ForecastStore, ReportStore, SentimentStore};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct FinanceService {
    reports: Arc<dyn ReportStore>,
    forecasts: Arc<dyn ForecastStore>,
    sentiments: Arc<dyn SentimentStore>,
}

impl FinanceService {
    pub fn new(
        reports: Arc<dyn ReportStore>,
        forecasts: Arc<dyn ForecastStore>,
        sentiments: Arc<dyn SentimentStore>,
    ) -> Self {
        Self {
            reports,
            forecasts,
            sentiments,
        }
    }

    pub async fn save_report(
        &self,
        email: &str,
        report_name: &str,
        summary: &str,
    ) -> Result<(), Error> {
        if email.trim().is_empty() || report_name.trim().is_empty() || summary.trim().is_empty() {
            return Err(Error::missing_fields());
        }

        let report = Report {
            email: email.to_string(),
            report_name: report_name.to_string(),
            summary: summary.to_string(),
            timestamp: Utc::now(),
        };

        let inserted = self
            .reports
            .insert(&report)
            .await
            .map_err(|e| Error::storage("Error saving report", e))?;
        if !inserted {
            return Err(Error::DuplicateReport);
        }
        Ok(())
    }

    pub async fn get_reports(&self, email: &str) -> Result<Vec<Report>, Error> {
        self.reports
            .find_all(email)
            .await
            .map_err(|e| Error::storage("Error fetching reports", e))
    }

    pub async fn get_report(&self, email: &str, report_name: &str) -> Result<Report, Error> {
        self.reports
            .find_one(email, report_name)
            .await
            .map_err(|e| Error::storage("Error fetching report", e))?
            .ok_or(Error::ReportNotFound)
    }

    pub async fn save_forecast(&self, request: SaveForecastRequest) -> Result<Uuid, Error> {
        let forecast = request.validate_and_into_forecast(Utc::now())?;

        let id = self
            .forecasts
            .insert(&forecast)
            .await
            .map_err(|e| Error::storage("Error saving forecast", e))?;

        tracing::info!(user_email = %forecast.user_email, ticker = %forecast.ticker, %id, "forecast saved");
        Ok(id)
    }

    pub async fn get_forecasts(&self, email: &str) -> Result<Vec<Forecast>, Error> {
        self.forecasts
            .find_by_user_email(email)
            .await
            .map_err(|e| Error::storage("Error fetching forecasts", e))
    }

    pub async fn save_sentiment(
        &self,
        email: &str,
        text: &str,
        sentiment: &str,
        confidence: f64,
    ) -> Result<(), Error> {
        let record = Sentiment {
            email: email.to_string(),
            text: text.to_string(),
            sentiment: sentiment.to_string(),
            confidence,
            timestamp: Utc::now(),
        };

        self.sentiments
            .insert(&record)
            .await
            .map_err(|e| Error::storage("Error saving sentiment", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::{MemoryForecastStore, MemoryReportStore, MemorySentimentStore};
    use serde_json::json;

    fn service_with_sentiments() -> (FinanceService, Arc<MemorySentimentStore>) {
        let sentiments = Arc::new(MemorySentimentStore::default());
        let service = FinanceService::new(
            Arc::new(MemoryReportStore::default()),
            Arc::new(MemoryForecastStore::default()),
            sentiments.clone(),
        );
        (service, sentiments)
    }

    fn service() -> FinanceService {
        service_with_sentiments().0
    }

    fn forecast_request() -> SaveForecastRequest {
        serde_json::from_value(json!({
            "user_email": "a@x.com",
            "ticker": "AAPL",
            "forecast_period_days": 7,
            "predictions": [{"date": "2025-11-01", "predicted_price": 178.45}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_report_rejected_and_first_summary_preserved() {
        let finance = service();
        finance
            .save_report("a@x.com", "Q3", "first summary")
            .await
            .unwrap();

        let err = finance
            .save_report("a@x.com", "Q3", "second summary")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateReport));

        let report = finance.get_report("a@x.com", "Q3").await.unwrap();
        assert_eq!(report.summary, "first summary");
    }

    #[tokio::test]
    async fn reports_are_scoped_to_their_email() {
        let finance = service();
        finance.save_report("a@x.com", "Q3", "alice").await.unwrap();
        finance.save_report("a@x.com", "Q4", "alice").await.unwrap();
        finance.save_report("b@x.com", "Q3", "bob").await.unwrap();

        let reports = finance.get_reports("a@x.com").await.unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.email == "a@x.com"));

        // Same report name under another email is a separate record.
        let bobs = finance.get_reports("b@x.com").await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].summary, "bob");
    }

    #[tokio::test]
    async fn empty_report_fields_fail_validation() {
        let finance = service();
        let err = finance.save_report("a@x.com", "", "s").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn missing_report_is_not_found() {
        let finance = service();
        let err = finance.get_report("a@x.com", "Q3").await.unwrap_err();
        assert!(matches!(err, Error::ReportNotFound));
    }

    #[tokio::test]
    async fn forecast_with_empty_predictions_is_rejected() {
        let finance = service();
        let mut request = forecast_request();
        request.predictions.clear();

        let err = finance.save_forecast(request).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(finance.get_forecasts("a@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn forecasts_accumulate_with_distinct_ids() {
        let finance = service();
        let first = finance.save_forecast(forecast_request()).await.unwrap();
        let second = finance.save_forecast(forecast_request()).await.unwrap();
        assert_ne!(first, second);

        let forecasts = finance.get_forecasts("a@x.com").await.unwrap();
        assert_eq!(forecasts.len(), 2);
        assert!(forecasts.iter().all(|f| f.user_email == "a@x.com"));
    }

    #[tokio::test]
    async fn sentiments_are_append_only() {
        let (finance, sentiments) = service_with_sentiments();
        finance
            .save_sentiment("a@x.com", "great quarter", "positive", 0.92)
            .await
            .unwrap();
        finance
            .save_sentiment("a@x.com", "great quarter", "positive", 0.92)
            .await
            .unwrap();

        let rows = sentiments.all();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, rows[1].text);
    }
}
