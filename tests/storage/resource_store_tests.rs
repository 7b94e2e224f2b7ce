//! ResourceStore interface tests.
//!
//! These tests verify the contract of the ResourceStore trait.
//! Each storage implementation should run these tests.

use std::sync::Arc;

use inventory_service::model::{NewResource, ResourceStatus};
use inventory_service::storage::{ResourceStore, StorageError};
use uuid::Uuid;

fn new_resource(name: &str, description: Option<&str>) -> NewResource {
    NewResource {
        name: name.to_string(),
        resource_type: "test_room".to_string(),
        status: ResourceStatus::Available,
        description: description.map(str::to_string),
    }
}

// =============================================================================
// ResourceStore::create / find_by_id tests
// =============================================================================

pub async fn test_create_assigns_id_and_timestamps<S: ResourceStore + ?Sized>(store: &S) {
    let created = store
        .create(new_resource("test_create", Some("first floor")))
        .await
        .expect("create should succeed");

    assert!(!created.id.is_nil(), "store should assign an id");
    assert_eq!(created.name, "test_create");
    assert_eq!(created.resource_type, "test_room");
    assert_eq!(created.status, ResourceStatus::Available);
    assert_eq!(created.description.as_deref(), Some("first floor"));
    assert_eq!(created.created_at, created.updated_at);
}

pub async fn test_create_then_find<S: ResourceStore + ?Sized>(store: &S) {
    let created = store
        .create(new_resource("test_find", Some("desc")))
        .await
        .unwrap();

    let found = store
        .find_by_id(created.id)
        .await
        .expect("find_by_id should succeed");

    assert_eq!(found, created, "stored record should round trip");
}

pub async fn test_null_description<S: ResourceStore + ?Sized>(store: &S) {
    let created = store.create(new_resource("test_null_desc", None)).await.unwrap();

    let found = store.find_by_id(created.id).await.unwrap();
    assert_eq!(found.description, None);
}

pub async fn test_find_missing<S: ResourceStore + ?Sized>(store: &S) {
    let missing = Uuid::new_v4();

    let result = store.find_by_id(missing).await;
    assert!(
        matches!(result, Err(StorageError::NotFound(id)) if id == missing),
        "missing record should be NotFound"
    );
}

// =============================================================================
// ResourceStore::find_all tests
// =============================================================================

pub async fn test_find_all_contains_created<S: ResourceStore + ?Sized>(store: &S) {
    let first = store.create(new_resource("test_all_1", None)).await.unwrap();
    let second = store.create(new_resource("test_all_2", None)).await.unwrap();

    let all = store.find_all().await.expect("find_all should succeed");
    let ids: Vec<Uuid> = all.iter().map(|r| r.id).collect();

    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));
    for pair in all.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at, "oldest first");
    }
}

// =============================================================================
// ResourceStore::update_status tests
// =============================================================================

pub async fn test_update_status<S: ResourceStore + ?Sized>(store: &S) {
    let created = store
        .create(new_resource("test_update", Some("desc")))
        .await
        .unwrap();

    let updated = store
        .update_status(created.id, ResourceStatus::Booked)
        .await
        .expect("update should succeed");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.status, ResourceStatus::Booked);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let found = store.find_by_id(created.id).await.unwrap();
    assert_eq!(found, updated, "update should be persisted");
}

pub async fn test_update_missing<S: ResourceStore + ?Sized>(store: &S) {
    let missing = Uuid::new_v4();

    let result = store.update_status(missing, ResourceStatus::Booked).await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));

    assert!(
        matches!(store.find_by_id(missing).await, Err(StorageError::NotFound(_))),
        "update of a missing record must not create it"
    );
}

pub async fn test_concurrent_updates<S: ResourceStore + ?Sized + 'static>(store: Arc<S>) {
    let created = store
        .create(new_resource("test_concurrent", Some("keep")))
        .await
        .unwrap();

    let updates = [
        ResourceStatus::Booked,
        ResourceStatus::Unavailable,
        ResourceStatus::Available,
        ResourceStatus::Booked,
    ]
    .into_iter()
    .map(|status| {
        let store = store.clone();
        async move { store.update_status(created.id, status).await }
    });

    for result in futures::future::join_all(updates).await {
        result.expect("every concurrent update should succeed");
    }

    // Last writer wins on status; no other field is lost.
    let found = store.find_by_id(created.id).await.unwrap();
    assert_eq!(found.name, "test_concurrent");
    assert_eq!(found.description.as_deref(), Some("keep"));
    assert!(ResourceStatus::ALL.contains(&found.status));
}

// =============================================================================
// ResourceStore::delete tests
// =============================================================================

pub async fn test_delete<S: ResourceStore + ?Sized>(store: &S) {
    let created = store.create(new_resource("test_delete", None)).await.unwrap();

    store.delete(created.id).await.expect("delete should succeed");

    assert!(matches!(
        store.find_by_id(created.id).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(
        matches!(store.delete(created.id).await, Err(StorageError::NotFound(_))),
        "second delete should be NotFound"
    );
}

/// Run all ResourceStore tests against a store held in an `Arc`.
#[macro_export]
macro_rules! run_resource_store_tests {
    ($store:expr) => {
        use $crate::storage::resource_store_tests::*;

        let store = $store;

        // create / find tests
        test_create_assigns_id_and_timestamps(store.as_ref()).await;
        println!("  test_create_assigns_id_and_timestamps: PASSED");

        test_create_then_find(store.as_ref()).await;
        println!("  test_create_then_find: PASSED");

        test_null_description(store.as_ref()).await;
        println!("  test_null_description: PASSED");

        test_find_missing(store.as_ref()).await;
        println!("  test_find_missing: PASSED");

        // find_all tests
        test_find_all_contains_created(store.as_ref()).await;
        println!("  test_find_all_contains_created: PASSED");

        // update tests
        test_update_status(store.as_ref()).await;
        println!("  test_update_status: PASSED");

        test_update_missing(store.as_ref()).await;
        println!("  test_update_missing: PASSED");

        test_concurrent_updates(store.clone()).await;
        println!("  test_concurrent_updates: PASSED");

        // delete tests
        test_delete(store.as_ref()).await;
        println!("  test_delete: PASSED");
    };
}
