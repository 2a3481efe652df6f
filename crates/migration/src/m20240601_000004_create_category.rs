//! Create `category` table.
//!
//! Case-insensitive name uniqueness is enforced by an expression index in
//! the add_indexes migration; `created_by` records the authoring admin's
//! user id without an FK.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(uuid(Category::Id).primary_key())
                    .col(string_len(Category::Name, 128).not_null())
                    .col(text_null(Category::Description))
                    .col(boolean(Category::IsActive).not_null())
                    .col(uuid(Category::CreatedBy).not_null())
                    .col(timestamp_with_time_zone(Category::CreatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Category::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Category::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
