//! FMP API client implementation.

use crate::{
    Result,
    error::FmpError,
    types::{FundamentalData, MarketCapPoint, Period, StatementRecord},
};
use reqwest::Client;
use std::env;
use tracing::{debug, warn};

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{FMP_BASE_URL}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{FMP_BASE_URL}/{endpoint}?apikey={}", self.api_key)
        }
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!(endpoint, "FMP request");
        let response = self.client.get(self.url(endpoint)).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;

        // Error payloads come back with a 200 status
        if text.contains("\"Error Message\"") {
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn statement_endpoint(
        statement: &str,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> String {
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        format!(
            "{statement}?symbol={}&period={}{limit_param}",
            symbol.to_uppercase(),
            period.as_str(),
        )
    }

    /// Get income statements for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<StatementRecord>> {
        self.get(&Self::statement_endpoint("income-statement", symbol, period, limit))
            .await
    }

    /// Get balance sheets for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn balance_sheet(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<StatementRecord>> {
        self.get(&Self::statement_endpoint(
            "balance-sheet-statement",
            symbol,
            period,
            limit,
        ))
        .await
    }

    /// Get cash flow statements for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn cash_flow(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<StatementRecord>> {
        self.get(&Self::statement_endpoint(
            "cash-flow-statement",
            symbol,
            period,
            limit,
        ))
        .await
    }

    /// Get daily market capitalization for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Stock ticker symbol
    /// * `from` - Start date (YYYY-MM-DD)
    /// * `to` - End date (YYYY-MM-DD)
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn historical_market_cap(
        &self,
        symbol: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<MarketCapPoint>> {
        let mut params = String::new();
        if let Some(f) = from {
            params.push_str(&format!("&from={f}"));
        }
        if let Some(t) = to {
            params.push_str(&format!("&to={t}"));
        }

        let endpoint = format!(
            "historical-market-capitalization?symbol={}{params}",
            symbol.to_uppercase()
        );
        self.get(&endpoint).await
    }

    /// Get statements and market-cap history for a symbol.
    ///
    /// The three statements and the market-cap history are fetched
    /// concurrently. A failed market-cap request leaves the history empty;
    /// a failed statement request fails the symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement request fails or the symbol has no
    /// income statements.
    pub async fn fundamental_data(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<FundamentalData> {
        let (income, balance, cash, caps) = tokio::join!(
            self.income_statement(symbol, period, limit),
            self.balance_sheet(symbol, period, limit),
            self.cash_flow(symbol, period, limit),
            self.historical_market_cap(symbol, None, None),
        );

        let income_statements = income?;
        if income_statements.is_empty() {
            return Err(FmpError::NoData(symbol.to_uppercase()));
        }

        let market_caps = caps.unwrap_or_else(|e| {
            warn!(symbol, error = %e, "market cap history unavailable");
            Vec::new()
        });

        Ok(FundamentalData {
            symbol: symbol.to_uppercase(),
            income_statements,
            balance_sheets: balance?,
            cash_flows: cash?,
            market_caps,
        })
    }

    /// Get statements for multiple symbols, one symbol at a time.
    ///
    /// Symbols that fail are logged and left out.
    pub async fn bulk_fundamental_data(
        &self,
        symbols: &[&str],
        period: Period,
        limit: Option<u32>,
    ) -> Vec<FundamentalData> {
        let mut results = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            match self.fundamental_data(symbol, period, limit).await {
                Ok(data) => results.push(data),
                Err(e) => warn!(symbol, error = %e, "failed to fetch fundamentals"),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = FmpClient::new("test_key");
        assert_eq!(
            client.url("historical-market-capitalization?symbol=AAPL"),
            "https://financialmodelingprep.com/stable/historical-market-capitalization?symbol=AAPL&apikey=test_key"
        );
        assert_eq!(
            client.url("income-statement?symbol=AAPL&period=annual"),
            "https://financialmodelingprep.com/stable/income-statement?symbol=AAPL&period=annual&apikey=test_key"
        );
    }

    #[test]
    fn test_statement_endpoint() {
        assert_eq!(
            FmpClient::statement_endpoint("balance-sheet-statement", "msft", Period::Quarter, Some(8)),
            "balance-sheet-statement?symbol=MSFT&period=quarter&limit=8"
        );
        assert_eq!(
            FmpClient::statement_endpoint("cash-flow-statement", "AAPL", Period::Annual, None),
            "cash-flow-statement?symbol=AAPL&period=annual"
        );
    }
}
