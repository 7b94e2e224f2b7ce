//! Inventory service: the resource lifecycle rules.
//!
//! Shape checks (required fields, status membership, identifier format) all
//! run before the first storage round trip, so malformed input always fails
//! with a caller error and never touches persistence.

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::model::{NewResource, Resource, ResourceStatus};
use crate::repository::{RepositoryError, ResourceRepository};
use crate::storage::StorageError;

/// Inventory errors.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Required creation field missing.
    #[error("{0}")]
    Validation(String),

    /// Status value outside the fixed set.
    #[error("invalid status: {0:?}")]
    InvalidStatus(String),

    #[error("invalid resource id format: {0:?}")]
    InvalidIdentifier(String),

    #[error("resource not found: {0}")]
    NotFound(Uuid),

    /// Storage fault. The message is for logs only.
    #[error("storage failure: {0}")]
    Internal(#[source] StorageError),
}

impl From<RepositoryError> for InventoryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidIdentifier { id, .. } => InventoryError::InvalidIdentifier(id),
            RepositoryError::NotFound(id) => InventoryError::NotFound(id),
            RepositoryError::Storage(e) => InventoryError::Internal(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;

/// Inventory service.
///
/// Owns the business rules; holds no state besides the repository handle.
#[derive(Clone)]
pub struct InventoryService {
    repository: ResourceRepository,
}

impl InventoryService {
    pub fn new(repository: ResourceRepository) -> Self {
        Self { repository }
    }

    /// Create a resource. Status is always `available`.
    pub async fn create_resource(
        &self,
        name: &str,
        resource_type: &str,
        description: &str,
    ) -> Result<Resource> {
        if name.trim().is_empty() || resource_type.trim().is_empty() {
            debug!(name = %name, resource_type = %resource_type, "Rejected resource without name or type");
            return Err(InventoryError::Validation(
                "name and type are required".to_string(),
            ));
        }

        let resource = self
            .repository
            .create(NewResource {
                name: name.to_string(),
                resource_type: resource_type.to_string(),
                status: ResourceStatus::Available,
                description: (!description.is_empty()).then(|| description.to_string()),
            })
            .await
            .map_err(|e| log_failure("create", e))?;

        info!(resource_id = %resource.id, name = %resource.name, "Resource created");
        Ok(resource)
    }

    /// Every resource, storage-ordered. Empty when there are none.
    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        self.repository
            .list()
            .await
            .map_err(|e| log_failure("list", e))
    }

    pub async fn get_resource(&self, id: &str) -> Result<Resource> {
        self.repository
            .get(id)
            .await
            .map_err(|e| log_failure("get", e))
    }

    /// Whether the resource is currently `available`.
    ///
    /// The answer is a snapshot; a concurrent update may change it before the
    /// caller acts on it.
    pub async fn check_availability(&self, id: &str) -> Result<bool> {
        let resource = self
            .repository
            .get(id)
            .await
            .map_err(|e| log_failure("check_availability", e))?;
        Ok(resource.is_available())
    }

    /// Overwrite a resource's status.
    ///
    /// The status is validated before the id is parsed or storage is touched.
    /// The write itself is a single conditional statement, so concurrent
    /// updates to one id resolve last-writer-wins.
    pub async fn update_resource_status(&self, id: &str, new_status: &str) -> Result<Resource> {
        let status: ResourceStatus = new_status.parse().map_err(|_| {
            debug!(resource_id = %id, status = %new_status, "Rejected unknown status");
            InventoryError::InvalidStatus(new_status.to_string())
        })?;

        let resource = self
            .repository
            .update_status(id, status)
            .await
            .map_err(|e| log_failure("update_status", e))?;

        info!(resource_id = %resource.id, status = %resource.status, "Resource status updated");
        Ok(resource)
    }

    /// Permanently delete a resource, returning its id.
    pub async fn delete_resource(&self, id: &str) -> Result<Uuid> {
        let id = self
            .repository
            .delete(id)
            .await
            .map_err(|e| log_failure("delete", e))?;

        info!(resource_id = %id, "Resource deleted");
        Ok(id)
    }
}

/// Convert a repository error, logging storage faults with full detail.
fn log_failure(operation: &str, err: RepositoryError) -> InventoryError {
    let err = InventoryError::from(err);
    match &err {
        InventoryError::Internal(source) => {
            error!(operation = %operation, error = %source, "Storage failure");
        }
        other => debug!(operation = %operation, error = %other, "Request rejected"),
    }
    err
}
