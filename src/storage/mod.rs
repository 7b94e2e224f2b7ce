//! Storage implementations.
//!
//! [`ResourceStore`] is the storage adapter seam. It does not interpret
//! failures beyond reporting a missing row as [`StorageError::NotFound`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::config::{StorageConfig, StorageType};
use crate::model::{NewResource, Resource, ResourceStatus};

pub mod memory;

#[cfg(any(feature = "postgres", feature = "sqlite"))]
pub mod schema;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryResourceStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresResourceStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteResourceStore;

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Resource not found: {0}")]
    NotFound(Uuid),

    #[cfg(any(feature = "postgres", feature = "sqlite"))]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(any(feature = "postgres", feature = "sqlite"))]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt resource record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend not supported: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable create/read/update/delete for resource records.
///
/// Implementations:
/// - `PostgresResourceStore`: PostgreSQL storage
/// - `SqliteResourceStore`: SQLite storage
/// - `InMemoryResourceStore`: process-local map, for tests and local runs
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Insert a new record. The store assigns the id and both timestamps.
    async fn create(&self, resource: NewResource) -> Result<Resource>;

    /// Fetch one record. Missing rows yield [`StorageError::NotFound`].
    async fn find_by_id(&self, id: Uuid) -> Result<Resource>;

    /// Fetch every record, oldest first.
    async fn find_all(&self) -> Result<Vec<Resource>>;

    /// Overwrite the status of one record and refresh `updated_at`.
    ///
    /// Executed as a single conditional write; a missing row yields
    /// [`StorageError::NotFound`] and nothing is written.
    async fn update_status(&self, id: Uuid, status: ResourceStatus) -> Result<Resource>;

    /// Permanently remove one record. Zero affected rows yields
    /// [`StorageError::NotFound`].
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Initialize storage based on configuration.
///
/// SQL backends run their migrations before the store is returned.
pub async fn init_storage(
    config: &StorageConfig,
) -> std::result::Result<Arc<dyn ResourceStore>, Box<dyn std::error::Error>> {
    match config.storage_type {
        StorageType::Memory => {
            info!(storage_type = "memory", "Storage initialized (data is not persisted)");
            Ok(Arc::new(InMemoryResourceStore::new()))
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            let options = config.postgres.connect_options()?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.postgres.max_connections)
                .connect_with(options)
                .await?;

            let store = PostgresResourceStore::new(pool);
            store.migrate().await?;

            info!(
                storage_type = "postgres",
                host = %config.postgres.host,
                dbname = %config.postgres.dbname,
                "Storage initialized"
            );
            Ok(Arc::new(store))
        }
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            if let Some(parent) = std::path::Path::new(&config.sqlite.path).parent() {
                std::fs::create_dir_all(parent)?;
            }

            let pool =
                sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.sqlite.path))
                    .await?;

            let store = SqliteResourceStore::new(pool);
            store.migrate().await?;

            info!(storage_type = "sqlite", path = %config.sqlite.path, "Storage initialized");
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        ref other => {
            tracing::error!(storage_type = ?other, "Storage backend not compiled in");
            Err(Box::new(StorageError::Unsupported(format!("{:?}", other))))
        }
    }
}
