use super::provider::{MarketDataError, MarketDataProvider, NewsWindow};
use super::records::{news_blob_name, LogEntry, LogSource, LogStatus, QuoteRecord};
use super::sinks::{BlobSink, DocumentSink, RowSink, SinkError};
use crate::config::IngestConfig;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const NEWS_CONTENT_TYPE: &str = "application/json";
const MARKET_NEWS_CATEGORY: &str = "general";

/// Failure of a single fetch-and-store attempt
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] MarketDataError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Where each pipeline writes, and for which symbols
#[derive(Debug, Clone)]
pub struct IngestTargets {
    pub tickers: Vec<String>,
    pub table_id: String,
    pub bucket_name: String,
    pub log_collection: String,
    pub market_news_collection: String,
    pub market_news_limit: usize,
    pub news_lookback_days: u32,
}

impl From<&IngestConfig> for IngestTargets {
    fn from(config: &IngestConfig) -> Self {
        Self {
            tickers: config.tickers.clone(),
            table_id: config.table_id.clone(),
            bucket_name: config.bucket_name.clone(),
            log_collection: config.collection_name.clone(),
            market_news_collection: config.market_news_collection.clone(),
            market_news_limit: config.market_news_limit,
            news_lookback_days: config.news_lookback_days,
        }
    }
}

/// Per-run outcome counts, reported only through the process log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub prices_inserted: usize,
    pub news_uploaded: usize,
    pub market_news_runs: usize,
    pub errors: usize,
}

impl RunSummary {
    fn count(&mut self, status: LogStatus, success: &mut usize) {
        match status {
            LogStatus::Error => self.errors += 1,
            LogStatus::Inserted | LogStatus::Uploaded => *success += 1,
        }
    }
}

/// Ingestion service wiring the upstream provider to the three sinks.
///
/// Holds long-lived clients so one instance can serve many invocations.
pub struct IngestService {
    provider: Arc<dyn MarketDataProvider>,
    rows: Arc<dyn RowSink>,
    documents: Arc<dyn DocumentSink>,
    blobs: Arc<dyn BlobSink>,
    targets: IngestTargets,
}

impl IngestService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        rows: Arc<dyn RowSink>,
        documents: Arc<dyn DocumentSink>,
        blobs: Arc<dyn BlobSink>,
        targets: IngestTargets,
    ) -> Self {
        Self {
            provider,
            rows,
            documents,
            blobs,
            targets,
        }
    }

    pub fn targets(&self) -> &IngestTargets {
        &self.targets
    }

    /// Run every pipeline once: prices for all tickers, then news for all
    /// tickers, then the general market feed. Failures are logged per
    /// ticker and never abort the run.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        log::info!(
            "Starting ingestion for {} tickers via {}",
            self.targets.tickers.len(),
            self.provider.name()
        );

        let mut inserted = 0;
        for symbol in &self.targets.tickers {
            let status = self.ingest_price(symbol, Utc::now()).await;
            summary.count(status, &mut inserted);
        }
        summary.prices_inserted = inserted;

        let mut uploaded = 0;
        for symbol in &self.targets.tickers {
            let status = self.ingest_news(symbol, Utc::now()).await;
            summary.count(status, &mut uploaded);
        }
        summary.news_uploaded = uploaded;

        let mut market = 0;
        if let Some(status) = self.ingest_market_news(Utc::now()).await {
            summary.count(status, &mut market);
        }
        summary.market_news_runs = market;

        log::info!(
            "Ingestion finished: {} prices, {} news uploads, {} market news batches, {} errors",
            summary.prices_inserted,
            summary.news_uploaded,
            summary.market_news_runs,
            summary.errors
        );
        summary
    }

    /// Fetch one quote, write it as a table row and log the outcome
    pub async fn ingest_price(&self, symbol: &str, now: DateTime<Utc>) -> LogStatus {
        let entry = match self.store_quote(symbol, now).await {
            Ok(data) => {
                log::info!("📈 Inserted quote row for {symbol}");
                LogEntry::inserted(LogSource::StockPrice, Some(symbol), data, now)
            }
            Err(e) => {
                log::error!("Price ingestion failed for {symbol}: {e}");
                LogEntry::error(LogSource::StockPrice, Some(symbol), e.to_string(), now)
            }
        };
        self.record(entry).await
    }

    /// Fetch the trailing news window for one symbol, upload it verbatim as
    /// a blob and log the outcome
    pub async fn ingest_news(&self, symbol: &str, now: DateTime<Utc>) -> LogStatus {
        let entry = match self.store_news(symbol, now).await {
            Ok(filename) => {
                log::info!("📰 Uploaded {filename}");
                LogEntry::uploaded(LogSource::StockNews, Some(symbol), filename, now)
            }
            Err(e) => {
                log::error!("News ingestion failed for {symbol}: {e}");
                LogEntry::error(LogSource::StockNews, Some(symbol), e.to_string(), now)
            }
        };
        self.record(entry).await
    }

    /// Store the head of the general news feed as documents. Returns `None`
    /// when the feed is disabled.
    pub async fn ingest_market_news(&self, now: DateTime<Utc>) -> Option<LogStatus> {
        if self.targets.market_news_limit == 0 {
            log::debug!("Market news feed disabled");
            return None;
        }

        let entry = match self.store_market_news(now).await {
            Ok(count) => {
                log::info!("🗞️ Stored {count} market news articles");
                LogEntry::inserted(
                    LogSource::MarketNews,
                    None,
                    json!({
                        "articles": count,
                        "collection": self.targets.market_news_collection,
                    }),
                    now,
                )
            }
            Err(e) => {
                log::error!("Market news ingestion failed: {e}");
                LogEntry::error(LogSource::MarketNews, None, e.to_string(), now)
            }
        };
        Some(self.record(entry).await)
    }

    async fn store_quote(&self, symbol: &str, now: DateTime<Utc>) -> Result<Value, IngestError> {
        validate_symbol(symbol)?;

        let payload = self.provider.get_quote(symbol).await?;
        let record = QuoteRecord::from_payload(symbol, payload, now);
        self.rows
            .insert_rows(&self.targets.table_id, std::slice::from_ref(&record))
            .await?;

        Ok(serde_json::to_value(&record).map_err(SinkError::from)?)
    }

    async fn store_news(&self, symbol: &str, now: DateTime<Utc>) -> Result<String, IngestError> {
        validate_symbol(symbol)?;

        let window = NewsWindow::trailing(now.date_naive(), self.targets.news_lookback_days);
        let articles = self.provider.get_company_news(symbol, &window).await?;
        log::debug!(
            "Fetched {} articles for {symbol} ({} to {})",
            articles.len(),
            window.from_param(),
            window.to_param()
        );

        let content = serde_json::to_string(&articles).map_err(SinkError::from)?;
        let filename = news_blob_name(symbol, now);
        self.blobs
            .upload(&self.targets.bucket_name, &filename, content, NEWS_CONTENT_TYPE)
            .await?;

        Ok(filename)
    }

    async fn store_market_news(&self, now: DateTime<Utc>) -> Result<usize, IngestError> {
        let articles = self.provider.get_market_news(MARKET_NEWS_CATEGORY).await?;
        let fetched_at = Value::String(now.to_rfc3339());

        let mut stored = 0;
        for article in articles.into_iter().take(self.targets.market_news_limit) {
            let mut document = match article {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("article".to_string(), other);
                    map
                }
            };
            document
                .entry("fetched_at")
                .or_insert_with(|| fetched_at.clone());

            self.documents
                .add_document(&self.targets.market_news_collection, document)
                .await?;
            stored += 1;
        }
        Ok(stored)
    }

    /// Append a log entry; a failing log sink is reported but not fatal
    async fn record(&self, entry: LogEntry) -> LogStatus {
        let status = entry.status;
        let document = match entry.to_document() {
            Ok(document) => document,
            Err(e) => {
                log::error!("Failed to serialize log entry: {e}");
                return status;
            }
        };

        if let Err(e) = self
            .documents
            .add_document(&self.targets.log_collection, document)
            .await
        {
            log::error!(
                "Failed to write {:?} log entry to {}: {e}",
                entry.source,
                self.targets.log_collection
            );
        }
        status
    }
}

fn validate_symbol(symbol: &str) -> Result<(), MarketDataError> {
    if symbol.trim().is_empty() {
        return Err(MarketDataError::InvalidSymbol(
            "Symbol cannot be empty".to_string(),
        ));
    }
    Ok(())
}
