use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error types for market data operations
#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    /// Request never produced a response
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Upstream answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// Response body was not the expected JSON
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Empty or malformed ticker symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            MarketDataError::ParseError(error.to_string())
        } else if error.is_builder() {
            MarketDataError::ConfigError(error.to_string())
        } else {
            MarketDataError::NetworkError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(error: serde_json::Error) -> Self {
        MarketDataError::ParseError(error.to_string())
    }
}

/// Raw quote as returned by the upstream quote endpoint.
///
/// Every field is optional: the upstream response is trusted and a missing
/// key simply leaves the value unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotePayload {
    /// Current price
    #[serde(rename = "c", default)]
    pub current: Option<f64>,
    /// Daily high
    #[serde(rename = "h", default)]
    pub high: Option<f64>,
    /// Daily low
    #[serde(rename = "l", default)]
    pub low: Option<f64>,
    /// Opening price
    #[serde(rename = "o", default)]
    pub open: Option<f64>,
    /// Previous closing price
    #[serde(rename = "pc", default)]
    pub previous_close: Option<f64>,
    /// Trading volume
    #[serde(rename = "v", default)]
    pub volume: Option<f64>,
    /// Last trade time (unix seconds)
    #[serde(rename = "t", default)]
    pub trade_time: Option<i64>,
}

/// Article list passed through verbatim
pub type NewsPayload = Vec<Value>;

/// Inclusive date range for company news queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl NewsWindow {
    /// Window of `days` calendar days ending on `today`, both ends included
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.max(1) - 1);
        let from = today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    /// Number of calendar days covered
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

/// Trait for upstream market data sources
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Fetch the current quote for a single symbol
    async fn get_quote(&self, symbol: &str) -> Result<QuotePayload, MarketDataError>;

    /// Fetch company news for a symbol within the given window
    async fn get_company_news(
        &self,
        symbol: &str,
        window: &NewsWindow,
    ) -> Result<NewsPayload, MarketDataError>;

    /// Fetch the general news feed for a category (not specific to a symbol)
    async fn get_market_news(&self, category: &str) -> Result<NewsPayload, MarketDataError>;
}
