//! Create `service` table with FK to `category`.
//!
//! `Restrict` on the category FK: a category with services cannot be
//! deleted, mirroring the service-layer check.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::CategoryId).not_null())
                    .col(string_len(Service::Name, 128).not_null())
                    .col(text_null(Service::Description))
                    .col(decimal_len(Service::FixedRate, 10, 2).not_null())
                    .col(decimal_len(Service::EstimatedDurationHours, 5, 2).not_null())
                    .col(string_len_null(Service::ImageUrl, 512))
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Service::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_category")
                            .from(Service::Table, Service::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    CategoryId,
    Name,
    Description,
    FixedRate,
    EstimatedDurationHours,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Category { Table, Id }
