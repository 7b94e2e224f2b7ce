//! PostgreSQL storage integration tests using testcontainers.
//!
//! Run with: cargo test --test storage_postgres --features postgres -- --ignored --nocapture
//!
//! These tests spin up PostgreSQL in a container using testcontainers-rs,
//! run migrations through `init_storage`, and test the ResourceStore contract.

#[macro_use]
mod storage;

use std::time::Duration;

use inventory_service::config::{PostgresConfig, StorageConfig, StorageType};
use inventory_service::storage::init_storage;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    GenericImage, ImageExt,
};

/// Start PostgreSQL container.
///
/// Returns the container (dropping it stops PostgreSQL) and a storage config
/// pointing at it.
async fn start_postgres() -> (testcontainers::ContainerAsync<GenericImage>, StorageConfig) {
    // PostgreSQL prints the readiness message twice: once during initial
    // setup and once when fully ready.
    let image = GenericImage::new("postgres", "16")
        .with_exposed_port(5432.tcp())
        .with_wait_for(WaitFor::message_on_stdout(
            "database system is ready to accept connections",
        ));

    let container = image
        .with_env_var("POSTGRES_USER", "inventory")
        .with_env_var("POSTGRES_PASSWORD", "inventory")
        .with_env_var("POSTGRES_DB", "inventory")
        .with_startup_timeout(Duration::from_secs(60))
        .start()
        .await
        .expect("Failed to start postgres container");

    tokio::time::sleep(Duration::from_secs(1)).await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get mapped port");
    let host = container
        .get_host()
        .await
        .expect("Failed to get container host");

    let config = StorageConfig {
        storage_type: StorageType::Postgres,
        postgres: PostgresConfig {
            host: host.to_string(),
            user: "inventory".to_string(),
            password: "inventory".to_string(),
            dbname: "inventory".to_string(),
            port: port.to_string(),
            sslmode: "disable".to_string(),
            timezone: "UTC".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };

    (container, config)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_postgres_resource_store() {
    println!("=== PostgreSQL ResourceStore Tests ===");
    println!("Starting PostgreSQL container...");

    let (_container, config) = start_postgres().await;
    let store = init_storage(&config)
        .await
        .expect("Failed to initialize PostgreSQL storage");

    println!("Running ResourceStore tests...");
    run_resource_store_tests!(store);

    println!("=== All PostgreSQL ResourceStore tests PASSED ===");
}
