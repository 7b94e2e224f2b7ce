//! PostgreSQL ResourceStore implementation.
//!
//! Ids come from `gen_random_uuid()` and timestamps from `now()`, so the
//! database is the single source of both.

use async_trait::async_trait;
use sea_query::{Expr, Order, PostgresQueryBuilder, Query};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::schema::{Resources, RESOURCE_COLUMNS};
use super::{ResourceStore, Result, StorageError};
use crate::model::{NewResource, Resource, ResourceStatus};

/// PostgreSQL implementation of ResourceStore.
pub struct PostgresResourceStore {
    pool: PgPool,
}

impl PostgresResourceStore {
    /// Create a new PostgreSQL resource store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("migrations/postgres").run(&self.pool).await?;
        Ok(())
    }
}

fn resource_from_row(row: &PgRow) -> Result<Resource> {
    let id: Uuid = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<ResourceStatus>()
        .map_err(|e| StorageError::CorruptRecord {
            id: id.to_string(),
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
impl ResourceStore for PostgresResourceStore {
    async fn create(&self, resource: NewResource) -> Result<Resource> {
        let query = Query::insert()
            .into_table(Resources::Table)
            .columns([
                Resources::Name,
                Resources::Type,
                Resources::Status,
                Resources::Description,
            ])
            .values_panic([
                resource.name.into(),
                resource.resource_type.into(),
                resource.status.as_str().into(),
                resource.description.into(),
            ])
            .returning_all()
            .to_string(PostgresQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        resource_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Resource> {
        let query = Query::select()
            .columns(RESOURCE_COLUMNS)
            .from(Resources::Table)
            .and_where(Expr::col(Resources::Id).eq(id.to_string()))
            .to_string(PostgresQueryBuilder);

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
            .to_string(PostgresQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(resource_from_row).collect()
    }

    async fn update_status(&self, id: Uuid, status: ResourceStatus) -> Result<Resource> {
        let query = Query::update()
            .table(Resources::Table)
            .values([
                (Resources::Status, status.as_str().into()),
                (Resources::UpdatedAt, Expr::current_timestamp().into()),
            ])
            .and_where(Expr::col(Resources::Id).eq(id.to_string()))
            .returning_all()
            .to_string(PostgresQueryBuilder);

        match sqlx::query(&query).fetch_optional(&self.pool).await? {
            Some(row) => resource_from_row(&row),
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let query = Query::delete()
            .from_table(Resources::Table)
            .and_where(Expr::col(Resources::Id).eq(id.to_string()))
            .to_string(PostgresQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }
}
