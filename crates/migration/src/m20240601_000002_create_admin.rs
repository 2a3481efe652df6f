//! Create `admin` table with FK to `user`.
//!
//! One-to-one extension carrying admin level, capability flags and the
//! last-login audit fields.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(uuid(Admin::Id).primary_key())
                    .col(uuid(Admin::UserId).unique_key().not_null())
                    .col(string_len(Admin::AdminLevel, 32).not_null())
                    .col(boolean(Admin::CanManageUsers).not_null())
                    .col(boolean(Admin::CanManageServices).not_null())
                    .col(boolean(Admin::CanViewReports).not_null())
                    .col(timestamp_with_time_zone_null(Admin::LastLoginAt))
                    .col(string_len_null(Admin::LastLoginIp, 64))
                    .col(timestamp_with_time_zone(Admin::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admin_user")
                            .from(Admin::Table, Admin::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Admin::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Admin {
    Table,
    Id,
    UserId,
    AdminLevel,
    CanManageUsers,
    CanManageServices,
    CanViewReports,
    LastLoginAt,
    LastLoginIp,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
