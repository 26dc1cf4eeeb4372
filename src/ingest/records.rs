use super::provider::QuotePayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Row written to the quote table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub open_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub volume: Option<f64>,
    /// Upstream last trade time (unix seconds)
    pub trade_time: Option<i64>,
    /// When the quote was fetched
    pub timestamp: DateTime<Utc>,
}

impl QuoteRecord {
    /// Map an upstream quote onto the fixed row shape, renaming only
    pub fn from_payload(symbol: &str, payload: QuotePayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            current_price: payload.current,
            high_price: payload.high,
            low_price: payload.low,
            open_price: payload.open,
            previous_close: payload.previous_close,
            volume: payload.volume,
            trade_time: payload.trade_time,
            timestamp,
        }
    }
}

/// Blob name for a company news upload, unique to the second
pub fn news_blob_name(symbol: &str, at: DateTime<Utc>) -> String {
    format!("stock_news_{}_{}.json", symbol, at.format("%Y%m%d%H%M%S"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    StockPrice,
    StockNews,
    MarketNews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Inserted,
    Uploaded,
    Error,
}

/// Outcome payload, serialized under its own key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogDetail {
    Data(Value),
    Filename(String),
    Error(String),
}

/// Activity log entry, one per pipeline attempt.
///
/// Serializes flat, e.g.
/// `{"source":"stock_news","status":"uploaded","symbol":"MSFT","filename":"...","timestamp":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub source: LogSource,
    pub status: LogStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub symbol: Option<String>,
    #[serde(flatten)]
    pub detail: LogDetail,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn inserted(
        source: LogSource,
        symbol: Option<&str>,
        data: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(source, LogStatus::Inserted, symbol, LogDetail::Data(data), timestamp)
    }

    pub fn uploaded(
        source: LogSource,
        symbol: Option<&str>,
        filename: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(source, LogStatus::Uploaded, symbol, LogDetail::Filename(filename), timestamp)
    }

    pub fn error(
        source: LogSource,
        symbol: Option<&str>,
        error: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(source, LogStatus::Error, symbol, LogDetail::Error(error), timestamp)
    }

    fn new(
        source: LogSource,
        status: LogStatus,
        symbol: Option<&str>,
        detail: LogDetail,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            status,
            symbol: symbol.map(str::to_string),
            detail,
            timestamp,
        }
    }

    /// Key-value form handed to the document sink
    pub fn to_document(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "log entry serialized to {other}, expected an object"
            ))),
        }
    }
}
