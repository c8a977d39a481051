//! FRED API client implementation.

use crate::{Result, error::FredError, series::MacroObservations};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use tracing::{debug, warn};

/// Endpoint for series observations.
const FRED_OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Federal Reserve Economic Data API client.
#[derive(Debug, Clone)]
pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    /// Create a new FRED client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new FRED client from the `FRED_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let api_key = env::var("FRED_API_KEY").map_err(|_| FredError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    fn query(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
            ("sort_order", "asc".to_string()),
        ];
        if let Some(start) = start {
            query.push(("observation_start", start.to_string()));
        }
        if let Some(end) = end {
            query.push(("observation_end", end.to_string()));
        }
        query
    }

    /// Get the observations of one series in ascending date order.
    ///
    /// Missing values (FRED's `"."`) are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn series_observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        debug!(series_id, "FRED request");
        let response = self
            .client
            .get(FRED_OBSERVATIONS_URL)
            .query(&self.query(series_id, start, end))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FredError::Api(format!("HTTP {status}: {text}")));
        }

        parse_observations(&response.text().await?)
    }

    /// Fetch several series, given as `(column, series_id)` pairs.
    ///
    /// Series that fail are logged and left out.
    pub async fn fetch_all(
        &self,
        series: &[(&str, &str)],
        start: Option<NaiveDate>,
    ) -> Vec<MacroObservations> {
        let mut results = Vec::with_capacity(series.len());
        for (column, series_id) in series {
            match self.series_observations(series_id, start, None).await {
                Ok(observations) => {
                    results.push(MacroObservations::new(*column, observations));
                }
                Err(e) => warn!(series_id, error = %e, "failed to fetch macro series"),
            }
        }
        results
    }
}

/// Parses a `series/observations` JSON body.
///
/// # Errors
///
/// Returns an error for malformed JSON or an unparseable date.
pub fn parse_observations(body: &str) -> Result<Vec<(NaiveDate, f64)>> {
    let response: ObservationsResponse = serde_json::from_str(body)?;
    let mut out = Vec::with_capacity(response.observations.len());
    for observation in response.observations {
        let Some(value) = parse_value(&observation.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&observation.date, "%Y-%m-%d")
            .map_err(|_| FredError::InvalidDate(observation.date.clone()))?;
        out.push((date, value));
    }
    out.sort_by_key(|(date, _)| *date);
    Ok(out)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query() {
        let client = FredClient::new("test_key");
        let start = NaiveDate::from_ymd_opt(2000, 1, 1);
        let query = client.query("UNRATE", start, None);
        assert!(query.contains(&("series_id", "UNRATE".to_string())));
        assert!(query.contains(&("api_key", "test_key".to_string())));
        assert!(query.contains(&("observation_start", "2000-01-01".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "observation_end"));
    }

    #[test]
    fn test_parse_observations() {
        let body = r#"{
            "observations": [
                {"realtime_start": "2024-01-01", "date": "2020-02-01", "value": "3.5"},
                {"realtime_start": "2024-01-01", "date": "2020-01-01", "value": "3.6"},
                {"realtime_start": "2024-01-01", "date": "2020-03-01", "value": "."}
            ]
        }"#;

        let observations = parse_observations(body).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0], (NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 3.6));
        assert_eq!(observations[1].1, 3.5);
    }

    #[test]
    fn test_parse_bad_date() {
        let body = r#"{"observations": [{"date": "01/02/2020", "value": "1.0"}]}"#;
        assert!(matches!(
            parse_observations(body),
            Err(FredError::InvalidDate(_))
        ));
    }
}
