//! SQLite ResourceStore implementation.
//!
//! SQLite has no UUID generator, so ids and timestamps are produced here and
//! written as text.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::schema::{Resources, RESOURCE_COLUMNS};
use super::{ResourceStore, Result, StorageError};
use crate::model::{NewResource, Resource, ResourceStatus};

/// SQLite implementation of ResourceStore.
pub struct SqliteResourceStore {
    pool: SqlitePool,
}

impl SqliteResourceStore {
    /// Create a new SQLite resource store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn now_text() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn resource_from_row(row: &SqliteRow) -> Result<Resource> {
    let raw_id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&raw_id).map_err(|e| StorageError::CorruptRecord {
        id: raw_id.clone(),
        reason: e.to_string(),
    })?;
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<ResourceStatus>()
        .map_err(|e| StorageError::CorruptRecord {
            id: raw_id,
            reason: e.to_string(),
        })?;

    Ok(Resource {
        id,
        name: row.try_get("name")?,
        resource_type: row.try_get("type")?,
        status,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ResourceStore for SqliteResourceStore {
    async fn create(&self, resource: NewResource) -> Result<Resource> {
        let id = Uuid::new_v4();
        let now = now_text();

        let query = Query::insert()
            .into_table(Resources::Table)
            .columns(RESOURCE_COLUMNS)
            .values_panic([
                id.to_string().into(),
                resource.name.into(),
                resource.resource_type.into(),
                resource.status.as_str().into(),
                resource.description.into(),
                now.clone().into(),
                now.into(),
            ])
            .returning_all()
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        resource_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Resource> {
        let query = Query::select()
            .columns(RESOURCE_COLUMNS)
            .from(Resources::Table)
            .and_where(Expr::col(Resources::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);

        match sqlx::query(&query).fetch_optional(&self.pool).await? {
            Some(row) => resource_from_row(&row),
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn find_all(&self) -> Result<Vec<Resource>> {
        let query = Query::select()
            .columns(RESOURCE_COLUMNS)
            .from(Resources::Table)
            .order_by(Resources::CreatedAt, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(resource_from_row).collect()
    }

    async fn update_status(&self, id: Uuid, status: ResourceStatus) -> Result<Resource> {
        let query = Query::update()
            .table(Resources::Table)
            .values([
                (Resources::Status, status.as_str().into()),
                (Resources::UpdatedAt, now_text().into()),
            ])
            .and_where(Expr::col(Resources::Id).eq(id.to_string()))
            .returning_all()
            .to_string(SqliteQueryBuilder);

        match sqlx::query(&query).fetch_optional(&self.pool).await? {
            Some(row) => resource_from_row(&row),
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let query = Query::delete()
            .from_table(Resources::Table)
            .and_where(Expr::col(Resources::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteResourceStore {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to SQLite");
        let store = SqliteResourceStore::new(pool);
        store.migrate().await.expect("Failed to run migrations");
        store
    }

    fn new_desk(description: Option<&str>) -> NewResource {
        NewResource {
            name: "Desk 12".to_string(),
            resource_type: "desk".to_string(),
            status: ResourceStatus::Available,
            description: description.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_round_trip() {
        let store = store().await;

        let created = store.create(new_desk(Some("window seat"))).await.unwrap();
        let found = store.find_by_id(created.id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(found.description.as_deref(), Some("window seat"));
    }

    #[tokio::test]
    async fn test_missing_description_is_null() {
        let store = store().await;

        let created = store.create(new_desk(None)).await.unwrap();

        assert_eq!(store.find_by_id(created.id).await.unwrap().description, None);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let store = store().await;
        let id = Uuid::new_v4();

        assert!(matches!(
            store.update_status(id, ResourceStatus::Booked).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(store.delete(id).await, Err(StorageError::NotFound(_))));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_unknown_status() {
        let store = store().await;

        let result = sqlx::query(
            "INSERT INTO resources (id, name, type, status, created_at, updated_at) \
             VALUES ('x', 'n', 't', 'reserved', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .execute(&store.pool)
        .await;

        assert!(result.is_err());
    }
}
