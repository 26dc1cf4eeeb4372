/// Market data ingestion: fetch, transform, write, log
pub mod provider;
pub mod finnhub;
pub mod records;
pub mod sinks;
pub mod aws;
pub mod pipeline;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use aws::{load_sdk_config, DynamoDbStore, S3BlobStore};
pub use finnhub::{FinnhubConfig, FinnhubProvider};
pub use pipeline::{IngestService, IngestTargets, RunSummary};
