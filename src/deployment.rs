use std::env;
use std::sync::Arc;
use log::info;

#[cfg(feature = "axum-server")]
use axum::{routing::any, routing::get, Router};

#[cfg(feature = "lambda")]
use lambda_runtime::service_fn;

use crate::handlers::handle_ingest;
use crate::ingest::IngestService;

#[cfg(feature = "lambda")]
use crate::handlers::lambda_handler;

#[cfg(feature = "axum-server")]
use crate::handlers::{health_check, ingest_endpoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Lambda,
    Server,
    Once,
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentMode::Lambda => write!(f, "AWS LAMBDA"),
            DeploymentMode::Server => write!(f, "HTTP SERVER"),
            DeploymentMode::Once => write!(f, "ONE-SHOT"),
        }
    }
}

fn is_lambda_environment(var: &impl Fn(&str) -> Option<String>) -> bool {
    // Check if running on AWS Lambda
    var("AWS_LAMBDA_FUNCTION_NAME").is_some() ||
    var("LAMBDA_RUNTIME_API").is_some() ||
    // Manual override
    var("LAMBDA_MODE").map(|v| v == "true").unwrap_or(false)
}

fn is_server_environment(var: &impl Fn(&str) -> Option<String>) -> bool {
    // Cloud platforms that route HTTP traffic set PORT
    var("PORT").is_some() ||
    // Manual override
    var("SERVER_MODE").map(|v| v == "true").unwrap_or(false)
}

pub fn detect_deployment_mode_with(var: impl Fn(&str) -> Option<String>) -> DeploymentMode {
    if is_lambda_environment(&var) {
        DeploymentMode::Lambda
    } else if is_server_environment(&var) {
        DeploymentMode::Server
    } else {
        DeploymentMode::Once
    }
}

pub fn detect_deployment_mode() -> DeploymentMode {
    detect_deployment_mode_with(|name| env::var(name).ok())
}

#[cfg(feature = "lambda")]
pub async fn run_lambda_mode(service: Arc<IngestService>) -> Result<(), Box<dyn std::error::Error>> {
    info!("☁️ AWS Lambda environment detected - setting up Lambda runtime");
    info!("👂 Lambda handler ready to receive invocations!");

    lambda_runtime::run(service_fn(move |event| {
        let service = service.clone();
        async move { lambda_handler(service, event).await }
    }))
    .await
    .map_err(|e| format!("Lambda runtime failed: {e}").into())
}

#[cfg(feature = "axum-server")]
pub async fn run_server_mode(
    service: Arc<IngestService>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("🌐 Server environment detected - running in HTTP mode");

    let app = Router::new()
        .route("/", get(health_check))
        .route("/ingest", any(ingest_endpoint))
        .with_state(service);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("Failed to bind to port: {e}"))?;

    info!("👂 Ingestion server listening on port {port} - trigger with /ingest");

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server failed: {e}").into())
}

pub async fn run_once_mode(service: Arc<IngestService>) {
    info!("🔄 No trigger environment detected - running a single ingestion pass");
    info!("🎯 Tickers: {}", service.targets().tickers.join(", "));

    let message = handle_ingest(&service).await;
    info!("🏁 {message}");
}
