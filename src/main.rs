use log::info;
use std::sync::Arc;

mod config;
mod deployment;
mod handlers;
mod ingest;

use config::IngestConfig;
use deployment::{detect_deployment_mode, run_once_mode, DeploymentMode};
use ingest::{
    load_sdk_config, DynamoDbStore, FinnhubConfig, FinnhubProvider, IngestService, IngestTargets,
    S3BlobStore,
};

#[cfg(feature = "lambda")]
use deployment::run_lambda_mode;

#[cfg(feature = "axum-server")]
use deployment::run_server_mode;

/// Build every client once; invocations share them through the service
async fn build_service(config: &IngestConfig) -> Result<IngestService, Box<dyn std::error::Error>> {
    let provider = FinnhubProvider::new(FinnhubConfig {
        api_key: config.api_key.clone(),
        base_url: config.base_url.clone(),
        timeout: config.request_timeout_secs,
    })?;

    let sdk_config = load_sdk_config().await;
    let dynamodb = Arc::new(DynamoDbStore::from_sdk_config(&sdk_config));
    let s3 = Arc::new(S3BlobStore::from_sdk_config(&sdk_config));

    Ok(IngestService::new(
        Arc::new(provider),
        dynamodb.clone(),
        dynamodb,
        s3,
        IngestTargets::from(config),
    ))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();
    info!("Starting market ingestion service...");

    let config = match IngestConfig::from_env() {
        Ok(config) => config,
        Err(e) => panic!("Invalid configuration: {e}"),
    };
    let service = match build_service(&config).await {
        Ok(service) => Arc::new(service),
        Err(e) => panic!("Failed to initialize clients: {e}"),
    };

    let deployment_mode = detect_deployment_mode();
    info!("🚀 Deployment detection: {deployment_mode}");

    let result = match deployment_mode {
        DeploymentMode::Lambda => {
            #[cfg(feature = "lambda")]
            {
                run_lambda_mode(service).await
            }
            #[cfg(not(feature = "lambda"))]
            {
                panic!("Lambda environment detected but lambda feature not enabled. Compile with --features lambda");
            }
        }
        DeploymentMode::Server => {
            #[cfg(feature = "axum-server")]
            {
                run_server_mode(service, config.port).await
            }
            #[cfg(not(feature = "axum-server"))]
            {
                panic!("Server environment detected but axum-server feature not enabled. Compile with --features axum-server");
            }
        }
        DeploymentMode::Once => {
            run_once_mode(service).await;
            Ok(())
        }
    };

    if let Err(e) = result {
        panic!("Ingestion service failed: {e}");
    }
}
