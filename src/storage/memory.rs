//! In-memory resource store.
//!
//! Backs tests and local runs without a database. Failure toggles let tests
//! exercise the storage-fault paths of the layers above.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ResourceStore, Result, StorageError};
use crate::model::{NewResource, Resource, ResourceStatus};

/// Resource store that keeps records in a process-local map.
#[derive(Default)]
pub struct InMemoryResourceStore {
    resources: RwLock<HashMap<Uuid, Resource>>,
    fail_on_read: RwLock<bool>,
    fail_on_write: RwLock<bool>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with [`StorageError::Unavailable`].
    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    /// Make every write fail with [`StorageError::Unavailable`].
    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }

    async fn check_write(&self) -> Result<()> {
        if *self.fail_on_write.read().await {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn create(&self, resource: NewResource) -> Result<Resource> {
        self.check_write().await?;

        let now = Utc::now();
        let mut store = self.resources.write().await;

        // v4 collisions are not expected, but ids must never be reused.
        let mut id = Uuid::new_v4();
        while store.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let record = Resource {
            id,
            name: resource.name,
            resource_type: resource.resource_type,
            status: resource.status,
            description: resource.description,
            created_at: now,
            updated_at: now,
        };
        store.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Resource> {
        self.check_read().await?;
        self.resources
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    async fn find_all(&self) -> Result<Vec<Resource>> {
        self.check_read().await?;
        let mut all: Vec<Resource> = self.resources.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn update_status(&self, id: Uuid, status: ResourceStatus) -> Result<Resource> {
        self.check_write().await?;
        let mut store = self.resources.write().await;
        let record = store.get_mut(&id).ok_or(StorageError::NotFound(id))?;
        record.status = status;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.check_write().await?;
        self.resources
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }
}
