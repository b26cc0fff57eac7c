use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub email: String,
    pub report_name: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub user_email: String,
    pub ticker: String,
    pub forecast_period_days: Option<i32>,
    pub predictions: Vec<Prediction>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(deserialize_with = "date_as_string")]
    pub date: String,
    pub predicted_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub email: String,
    pub text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Incoming forecast payload. Every field is optional at the wire level so
/// that missing data is reported through the validation path rather than a
/// deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveForecastRequest {
    pub user_email: Option<String>,
    pub ticker: Option<String>,
    pub forecast_period_days: Option<i32>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

impl SaveForecastRequest {
    pub fn validate_and_into_forecast(self, now: DateTime<Utc>) -> Result<Forecast, Error> {
        let user_email = self
            .user_email
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(Error::missing_fields)?;
        let ticker = self
            .ticker
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(Error::missing_fields)?;

        if self.predictions.is_empty() {
            return Err(Error::missing_fields());
        }

        Ok(Forecast {
            user_email,
            ticker,
            forecast_period_days: self.forecast_period_days,
            predictions: self.predictions,
            timestamp: now,
        })
    }
}

// Clients have been seen sending prediction dates as JSON numbers
// (epoch-ish values). Coerce scalars to their string form.
fn date_as_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "prediction date must be a string or number (got {other})"
        ))),
    }
}
