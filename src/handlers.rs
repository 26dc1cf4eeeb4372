use log::info;
#[cfg(any(feature = "axum-server", feature = "lambda"))]
use std::sync::Arc;

#[cfg(feature = "lambda")]
use lambda_runtime::{Error as LambdaError, LambdaEvent};
#[cfg(feature = "lambda")]
use serde_json::Value;

use crate::ingest::IngestService;

/// Fixed response body, independent of per-ticker outcomes
pub const COMPLETED_MESSAGE: &str = "Ingestion completed";

/// Run one ingestion pass. Partial failures live in the activity log only.
pub async fn handle_ingest(service: &IngestService) -> &'static str {
    let summary = service.run().await;
    if summary.errors > 0 {
        info!("⚠️ Ingestion completed with {} logged errors", summary.errors);
    } else {
        info!("✅ Ingestion completed cleanly");
    }
    COMPLETED_MESSAGE
}

#[cfg(feature = "axum-server")]
pub async fn ingest_endpoint(
    axum::extract::State(service): axum::extract::State<Arc<IngestService>>,
) -> (axum::http::StatusCode, &'static str) {
    info!("🔗 Ingestion triggered over HTTP");
    (axum::http::StatusCode::OK, handle_ingest(&service).await)
}

#[cfg(feature = "axum-server")]
pub async fn health_check() -> &'static str {
    "Ingestion service is running"
}

/// Lambda proxy response wrapping the fixed message
#[cfg(any(feature = "lambda", test))]
pub fn lambda_response(body: &str) -> serde_json::Value {
    serde_json::json!({
        "statusCode": 200,
        "body": body
    })
}

#[cfg(feature = "lambda")]
pub async fn lambda_handler(
    service: Arc<IngestService>,
    event: LambdaEvent<Value>,
) -> Result<Value, LambdaError> {
    info!("🔗 Lambda received event: {:?}", event.context.request_id);

    let body = handle_ingest(&service).await;
    Ok(lambda_response(body))
}
