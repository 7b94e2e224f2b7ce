//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! The tables themselves are created by the migrations under `migrations/`.

use sea_query::Iden;

/// Resources table schema.
#[derive(Iden, Clone, Copy)]
pub enum Resources {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "type"]
    Type,
    #[iden = "status"]
    Status,
    #[iden = "description"]
    Description,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// All columns, in the order rows are read back.
pub const RESOURCE_COLUMNS: [Resources; 7] = [
    Resources::Id,
    Resources::Name,
    Resources::Type,
    Resources::Status,
    Resources::Description,
    Resources::CreatedAt,
    Resources::UpdatedAt,
];
