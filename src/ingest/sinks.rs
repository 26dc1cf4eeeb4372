use super::records::QuoteRecord;
use serde_json::{Map, Value};

/// Sink error types
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("{rejected} of {total} rows were not written to {target}")]
    Rejected {
        target: String,
        rejected: usize,
        total: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SinkError {
    fn from(error: serde_json::Error) -> Self {
        SinkError::Serialization(error.to_string())
    }
}

/// Structured table accepting fixed-shape quote rows
#[async_trait::async_trait]
pub trait RowSink: Send + Sync {
    async fn insert_rows(&self, table_id: &str, rows: &[QuoteRecord]) -> Result<(), SinkError>;
}

/// Append-only document collections
#[async_trait::async_trait]
pub trait DocumentSink: Send + Sync {
    /// Append a document, returning its generated id
    async fn add_document(
        &self,
        collection: &str,
        document: Map<String, Value>,
    ) -> Result<String, SinkError>;
}

/// Object storage for raw payloads
#[async_trait::async_trait]
pub trait BlobSink: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        content: String,
        content_type: &str,
    ) -> Result<(), SinkError>;
}
