//! Create `booking` table.
//!
//! `technician_id` stays NULL until a claim wins; the service and address
//! FKs use `Restrict` so referenced rows cannot disappear under a booking.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::CustomerId).not_null())
                    .col(uuid_null(Booking::TechnicianId))
                    .col(uuid(Booking::ServiceId).not_null())
                    .col(uuid(Booking::AddressId).not_null())
                    .col(text(Booking::Description).not_null())
                    .col(string_len_null(Booking::ReferenceImage, 512))
                    .col(timestamp_with_time_zone(Booking::BookedAt).not_null())
                    .col(timestamp_with_time_zone(Booking::PreferredStart).not_null())
                    .col(timestamp_with_time_zone(Booking::PreferredEnd).not_null())
                    .col(string_len(Booking::Status, 32).not_null())
                    .col(decimal_len(Booking::TotalAmount, 10, 2).not_null())
                    .col(timestamp_with_time_zone_null(Booking::WorkCompletedAt))
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Booking::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_customer")
                            .from(Booking::Table, Booking::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_technician")
                            .from(Booking::Table, Booking::TechnicianId)
                            .to(Technician::Table, Technician::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_service")
                            .from(Booking::Table, Booking::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_address")
                            .from(Booking::Table, Booking::AddressId)
                            .to(Address::Table, Address::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    CustomerId,
    TechnicianId,
    ServiceId,
    AddressId,
    Description,
    ReferenceImage,
    BookedAt,
    PreferredStart,
    PreferredEnd,
    Status,
    TotalAmount,
    WorkCompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Technician { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }

#[derive(DeriveIden)]
enum Address { Table, Id }
