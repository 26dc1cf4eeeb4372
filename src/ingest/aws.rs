use super::records::QuoteRecord;
use super::sinks::{BlobSink, DocumentSink, RowSink, SinkError};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::{
    types::{AttributeValue, PutRequest, WriteRequest},
    Client as DynamoClient,
};
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// DynamoDB accepts at most 25 put requests per batch write
const BATCH_WRITE_LIMIT: usize = 25;

/// Partition key attribute generated for every row and document, kept apart
/// from any `id` the document itself carries
pub const ID_ATTRIBUTE: &str = "doc_id";

/// Load shared AWS configuration (region, credentials) from the environment
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::v2025_01_17())
        .load()
        .await
}

/// Convert an arbitrary JSON value into a DynamoDB attribute
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Turn a document into an item keyed by a fresh id
pub fn document_to_item(document: &Map<String, Value>) -> (String, HashMap<String, AttributeValue>) {
    let id = uuid::Uuid::new_v4().to_string();
    let mut item: HashMap<String, AttributeValue> = document
        .iter()
        .map(|(k, v)| (k.clone(), json_to_attribute(v)))
        .collect();
    item.insert(ID_ATTRIBUTE.to_string(), AttributeValue::S(id.clone()));
    (id, item)
}

pub fn record_to_item(record: &QuoteRecord) -> Result<HashMap<String, AttributeValue>, SinkError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(document_to_item(&map).1),
        _ => Err(SinkError::Serialization("quote record is not an object".to_string())),
    }
}

/// DynamoDB-backed quote table and document collections.
///
/// Table and collection identifiers map directly onto DynamoDB table names,
/// each with a string partition key named `doc_id`.
pub struct DynamoDbStore {
    client: DynamoClient,
}

impl DynamoDbStore {
    pub fn new(client: DynamoClient) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        log::info!("🗃️ DynamoDB client initialized");
        Self::new(DynamoClient::new(config))
    }
}

#[async_trait::async_trait]
impl RowSink for DynamoDbStore {
    async fn insert_rows(&self, table_id: &str, rows: &[QuoteRecord]) -> Result<(), SinkError> {
        let requests = rows
            .iter()
            .map(|row| -> Result<WriteRequest, SinkError> {
                let item = record_to_item(row)?;
                let put = PutRequest::builder()
                    .set_item(Some(item))
                    .build()
                    .map_err(|e| SinkError::Serialization(e.to_string()))?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>, SinkError>>()?;

        let mut rejected = 0;
        for chunk in requests.chunks(BATCH_WRITE_LIMIT) {
            let output = self
                .client
                .batch_write_item()
                .request_items(table_id, chunk.to_vec())
                .send()
                .await
                .map_err(|e| {
                    log::error!("Failed to write rows to {table_id}: {e:?}");
                    SinkError::Backend(aws_sdk_dynamodb::error::DisplayErrorContext(&e).to_string())
                })?;

            rejected += output
                .unprocessed_items()
                .and_then(|pending| pending.get(table_id))
                .map(Vec::len)
                .unwrap_or(0);
        }

        if rejected > 0 {
            return Err(SinkError::Rejected {
                target: table_id.to_string(),
                rejected,
                total: rows.len(),
            });
        }

        log::debug!("Wrote {} rows to {table_id}", rows.len());
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentSink for DynamoDbStore {
    async fn add_document(
        &self,
        collection: &str,
        document: Map<String, Value>,
    ) -> Result<String, SinkError> {
        let (id, item) = document_to_item(&document);

        self.client
            .put_item()
            .table_name(collection)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to add document to {collection}: {e:?}");
                SinkError::Backend(aws_sdk_dynamodb::error::DisplayErrorContext(&e).to_string())
            })?;

        Ok(id)
    }
}

/// S3-backed blob storage
pub struct S3BlobStore {
    client: S3Client,
}

impl S3BlobStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        log::info!("🪣 S3 client initialized");
        Self::new(S3Client::new(config))
    }
}

#[async_trait::async_trait]
impl BlobSink for S3BlobStore {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        content: String,
        content_type: &str,
    ) -> Result<(), SinkError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(name)
            .content_type(content_type)
            .body(ByteStream::from(content.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to upload {name} to {bucket}: {e:?}");
                SinkError::Backend(aws_sdk_s3::error::DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_json_scalars_to_attributes() {
        assert_eq!(json_to_attribute(&Value::Null), AttributeValue::Null(true));
        assert_eq!(json_to_attribute(&json!(true)), AttributeValue::Bool(true));
        assert_eq!(json_to_attribute(&json!(42)), AttributeValue::N("42".to_string()));
        assert_eq!(json_to_attribute(&json!(149.5)), AttributeValue::N("149.5".to_string()));
        assert_eq!(json_to_attribute(&json!("AAPL")), AttributeValue::S("AAPL".to_string()));
    }

    #[test]
    fn test_nested_json_to_attributes() {
        let value = json!({"headline": "Up", "related": ["AAPL", "MSFT"], "meta": {"id": 7}});
        let attribute = json_to_attribute(&value);

        let map = attribute.as_m().unwrap();
        assert_eq!(map["headline"], AttributeValue::S("Up".to_string()));
        assert_eq!(map["related"].as_l().unwrap().len(), 2);
        assert_eq!(
            map["meta"].as_m().unwrap()["id"],
            AttributeValue::N("7".to_string())
        );
    }

    #[test]
    fn test_document_to_item_adds_unique_id() {
        let mut document = Map::new();
        document.insert("status".to_string(), json!("uploaded"));

        let (first_id, item) = document_to_item(&document);
        let (second_id, _) = document_to_item(&document);

        assert_eq!(item[ID_ATTRIBUTE], AttributeValue::S(first_id.clone()));
        assert_eq!(item["status"], AttributeValue::S("uploaded".to_string()));
        assert_ne!(first_id, second_id);
    }

    #[test]
    fn test_document_to_item_keeps_upstream_id() {
        let article = json!({"id": 7134573, "headline": "Fed holds", "category": "top news"});
        let Value::Object(document) = article else {
            panic!("expected an object");
        };

        let (doc_id, item) = document_to_item(&document);

        assert_eq!(item["id"], AttributeValue::N("7134573".to_string()));
        assert_eq!(item["headline"], AttributeValue::S("Fed holds".to_string()));
        assert_eq!(item[ID_ATTRIBUTE], AttributeValue::S(doc_id));
        assert_eq!(item.len(), document.len() + 1);
    }

    #[test]
    fn test_record_to_item() {
        let record = QuoteRecord {
            symbol: "AAPL".to_string(),
            current_price: Some(150.0),
            high_price: Some(151.0),
            low_price: Some(149.0),
            open_price: Some(149.5),
            previous_close: Some(148.0),
            volume: None,
            trade_time: Some(1_700_000_000),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };

        let item = record_to_item(&record).unwrap();

        assert_eq!(item["symbol"], AttributeValue::S("AAPL".to_string()));
        assert_eq!(item["current_price"], AttributeValue::N("150.0".to_string()));
        assert_eq!(item["volume"], AttributeValue::Null(true));
        assert_eq!(item["trade_time"], AttributeValue::N("1700000000".to_string()));
        assert_eq!(
            item["timestamp"],
            AttributeValue::S("2023-11-14T22:13:20Z".to_string())
        );
        assert!(item.contains_key(ID_ATTRIBUTE));
    }

    #[test]
    fn test_rejected_rows_message() {
        let error = SinkError::Rejected {
            target: "stock_data".to_string(),
            rejected: 2,
            total: 3,
        };
        assert_eq!(error.to_string(), "2 of 3 rows were not written to stock_data");
    }
}
