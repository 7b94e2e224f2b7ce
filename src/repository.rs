//! Resource repository.
//!
//! Translates between the caller-facing string identifiers and the storage
//! adapter. Identifier parsing happens here so a malformed id never reaches
//! storage; storage errors pass through unchanged apart from lifting
//! `NotFound` into its own variant.

use std::sync::Arc;

use uuid::Uuid;

use crate::model::{NewResource, Resource, ResourceStatus};
use crate::storage::{ResourceStore, StorageError};

/// Repository errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("invalid uuid format: {id:?}")]
    InvalidIdentifier {
        id: String,
        #[source]
        source: uuid::Error,
    },

    #[error("resource not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for RepositoryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => RepositoryError::NotFound(id),
            other => RepositoryError::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Parse a caller-supplied resource identifier.
///
/// Accepts any textual form `uuid` understands (hyphenated, simple, braced,
/// urn).
pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|source| RepositoryError::InvalidIdentifier {
        id: raw.to_string(),
        source,
    })
}

/// Repository for resource records.
#[derive(Clone)]
pub struct ResourceRepository {
    store: Arc<dyn ResourceStore>,
}

impl ResourceRepository {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, resource: NewResource) -> Result<Resource> {
        Ok(self.store.create(resource).await?)
    }

    pub async fn list(&self) -> Result<Vec<Resource>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Resource> {
        let id = parse_id(id)?;
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn update_status(&self, id: &str, status: ResourceStatus) -> Result<Resource> {
        let id = parse_id(id)?;
        Ok(self.store.update_status(id, status).await?)
    }

    /// Delete a resource, returning its parsed id.
    pub async fn delete(&self, id: &str) -> Result<Uuid> {
        let id = parse_id(id)?;
        self.store.delete(id).await?;
        Ok(id)
    }
}
