//! inventory-server: resource inventory gRPC server
//!
//! Serves `inventory.InventoryService` plus the standard gRPC health and
//! server reflection services.
//! Mutating calls are gated by role through the configured identity service.
//!
//! ## Architecture
//! ```text
//! [Client] -> [trace] -> [auth gate] -> [InventoryService] -> [Storage]
//!                             |
//!                             v
//!                     [Identity Service]
//! ```
//!
//! ## Configuration
//! - `--config <path>` or INVENTORY_CONFIG: YAML config file
//! - INVENTORY__<SECTION>__<KEY>: structured overrides
//! - DB_HOST, DB_USER, DB_PASSWORD, DB_NAME, DB_PORT, DB_SSLMODE, TIMEZONE:
//!   PostgreSQL connection
//! - GRPC_PORT: listen port (default 50051)
//! - AUTH_SERVICE_URL: identity service validation endpoint
//! - INVENTORY_LOG: log filter (default "info")

use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::{error, info};

use inventory_service::auth::{build_validator, AuthGate, AuthLayer, ProtectedOperations};
use inventory_service::config::Config;
use inventory_service::handlers::InventoryGrpcService;
use inventory_service::proto::inventory_service_server::InventoryServiceServer;
use inventory_service::proto::FILE_DESCRIPTOR_SET;
use inventory_service::repository::ResourceRepository;
use inventory_service::services::InventoryService;
use inventory_service::storage::init_storage;
use inventory_service::transport::{grpc_trace_layer, serve_with_shutdown};
use inventory_service::utils::bootstrap::{init_tracing, parse_config_path, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!("Starting inventory-server");

    let store = init_storage(&config.storage).await.map_err(|e| {
        error!(error = %e, "Failed to initialize storage");
        e
    })?;

    let validator = build_validator(&config.auth)?;
    let operations = ProtectedOperations::from(config.auth.protected_operations.as_slice());
    info!(
        validator = ?config.auth.validator,
        protected = operations.len(),
        "Authorization gate configured"
    );
    let gate = AuthGate::new(operations, validator);

    let inventory = InventoryGrpcService::new(InventoryService::new(ResourceRepository::new(store)));

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<InventoryServiceServer<InventoryGrpcService>>()
        .await;
    health_reporter
        .set_service_status("", tonic_health::ServingStatus::Serving)
        .await;

    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let router = Server::builder()
        .timeout(config.server.request_timeout())
        .layer(grpc_trace_layer())
        .layer(AuthLayer::new(gate))
        .add_service(health_service)
        .add_service(reflection_service)
        .add_service(InventoryServiceServer::new(inventory));

    serve_with_shutdown(router, &config.server, shutdown_signal()).await?;

    Ok(())
}
