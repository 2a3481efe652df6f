//! Create `technician` table with FK to `user`.
//!
//! One-to-one extension: verification state plus document references,
//! availability and running job/rating/wallet counters.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Technician::Table)
                    .if_not_exists()
                    .col(uuid(Technician::Id).primary_key())
                    .col(uuid(Technician::UserId).unique_key().not_null())
                    .col(integer(Technician::ExperienceYears).not_null())
                    .col(decimal_len(Technician::RatingAverage, 3, 2).not_null())
                    .col(integer(Technician::TotalRatings).not_null())
                    .col(string_len(Technician::Availability, 32).not_null())
                    .col(decimal_len(Technician::WalletBalance, 12, 2).not_null())
                    .col(integer(Technician::TotalJobsCompleted).not_null())
                    .col(string_len(Technician::VerificationStatus, 32).not_null())
                    .col(timestamp_with_time_zone_null(Technician::VerifiedAt))
                    .col(string_len_null(Technician::IdProof, 512))
                    .col(string_len_null(Technician::Certificate, 512))
                    .col(timestamp_with_time_zone(Technician::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Technician::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_technician_user")
                            .from(Technician::Table, Technician::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Technician::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Technician {
    Table,
    Id,
    UserId,
    ExperienceYears,
    RatingAverage,
    TotalRatings,
    Availability,
    WalletBalance,
    TotalJobsCompleted,
    VerificationStatus,
    VerifiedAt,
    IdProof,
    Certificate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
