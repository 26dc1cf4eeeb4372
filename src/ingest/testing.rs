//! In-memory provider and sinks for exercising the pipelines offline.

use super::provider::{MarketDataError, MarketDataProvider, NewsPayload, NewsWindow, QuotePayload};
use super::records::QuoteRecord;
use super::sinks::{BlobSink, DocumentSink, RowSink, SinkError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeProvider {
    quotes: HashMap<String, Result<QuotePayload, String>>,
    news: HashMap<String, Result<NewsPayload, String>>,
    market_news: NewsPayload,
    pub news_windows: Mutex<Vec<(String, NewsWindow)>>,
    pub market_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with_quote(mut self, symbol: &str, body: Value) -> Self {
        let payload = serde_json::from_value(body).unwrap();
        self.quotes.insert(symbol.to_string(), Ok(payload));
        self
    }

    pub fn with_quote_error(mut self, symbol: &str, message: &str) -> Self {
        self.quotes.insert(symbol.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_news(mut self, symbol: &str, articles: Value) -> Self {
        let articles = serde_json::from_value(articles).unwrap();
        self.news.insert(symbol.to_string(), Ok(articles));
        self
    }

    pub fn with_news_error(mut self, symbol: &str, message: &str) -> Self {
        self.news.insert(symbol.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_market_news(mut self, articles: Value) -> Self {
        self.market_news = serde_json::from_value(articles).unwrap();
        self
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    fn name(&self) -> &str {
        "Fake"
    }

    async fn get_quote(&self, symbol: &str) -> Result<QuotePayload, MarketDataError> {
        match self.quotes.get(symbol) {
            Some(Ok(payload)) => Ok(payload.clone()),
            Some(Err(message)) => Err(MarketDataError::NetworkError(message.clone())),
            None => Ok(QuotePayload::default()),
        }
    }

    async fn get_company_news(
        &self,
        symbol: &str,
        window: &NewsWindow,
    ) -> Result<NewsPayload, MarketDataError> {
        self.news_windows
            .lock()
            .unwrap()
            .push((symbol.to_string(), *window));
        match self.news.get(symbol) {
            Some(Ok(articles)) => Ok(articles.clone()),
            Some(Err(message)) => Err(MarketDataError::NetworkError(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn get_market_news(&self, category: &str) -> Result<NewsPayload, MarketDataError> {
        self.market_calls.lock().unwrap().push(category.to_string());
        Ok(self.market_news.clone())
    }
}

#[derive(Default)]
pub struct MemoryRowSink {
    pub rows: Mutex<Vec<(String, QuoteRecord)>>,
    /// Symbol whose rows are refused
    pub reject_symbol: Option<String>,
}

#[async_trait]
impl RowSink for MemoryRowSink {
    async fn insert_rows(&self, table_id: &str, rows: &[QuoteRecord]) -> Result<(), SinkError> {
        if rows.iter().any(|r| Some(&r.symbol) == self.reject_symbol.as_ref()) {
            return Err(SinkError::Rejected {
                target: table_id.to_string(),
                rejected: rows.len(),
                total: rows.len(),
            });
        }
        let mut stored = self.rows.lock().unwrap();
        stored.extend(rows.iter().map(|r| (table_id.to_string(), r.clone())));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDocumentSink {
    pub documents: Mutex<Vec<(String, Map<String, Value>)>>,
    /// Collection that refuses every write
    pub fail_collection: Option<String>,
}

impl MemoryDocumentSink {
    pub fn in_collection(&self, collection: &str) -> Vec<Map<String, Value>> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, d)| d.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentSink for MemoryDocumentSink {
    async fn add_document(
        &self,
        collection: &str,
        document: Map<String, Value>,
    ) -> Result<String, SinkError> {
        if self.fail_collection.as_deref() == Some(collection) {
            return Err(SinkError::Backend(format!("{collection} unavailable")));
        }
        let mut documents = self.documents.lock().unwrap();
        documents.push((collection.to_string(), document));
        Ok(format!("doc-{}", documents.len()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub bucket: String,
    pub name: String,
    pub content: String,
    pub content_type: String,
}

#[derive(Default)]
pub struct MemoryBlobSink {
    pub blobs: Mutex<Vec<StoredBlob>>,
    pub fail: bool,
}

#[async_trait]
impl BlobSink for MemoryBlobSink {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        content: String,
        content_type: &str,
    ) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Backend("access denied".to_string()));
        }
        self.blobs.lock().unwrap().push(StoredBlob {
            bucket: bucket.to_string(),
            name: name.to_string(),
            content,
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}
