//! Create `user` table.
//!
//! Holds identity and credentials for every account regardless of role;
//! e-mail verification and password-reset tokens live here too.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::FullName, 128).not_null())
                    .col(string_len(User::Email, 255).unique_key().not_null())
                    .col(string_len_null(User::Phone, 32))
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(string_len(User::Role, 32).not_null())
                    .col(string_len(User::Status, 32).not_null())
                    .col(boolean(User::EmailConfirmed).not_null())
                    .col(string_len_null(User::VerificationToken, 64))
                    .col(timestamp_with_time_zone_null(User::TokenExpires))
                    .col(string_len_null(User::ResetToken, 64))
                    .col(timestamp_with_time_zone_null(User::ResetTokenExpires))
                    .col(string_len_null(User::ProfileImage, 512))
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    FullName,
    Email,
    Phone,
    PasswordHash,
    Role,
    Status,
    EmailConfirmed,
    VerificationToken,
    TokenExpires,
    ResetToken,
    ResetTokenExpires,
    ProfileImage,
    CreatedAt,
    UpdatedAt,
}
