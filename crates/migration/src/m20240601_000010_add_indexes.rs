use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Booking: the job feed filters on status, assignment and owner
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_status")
                    .table(Booking::Table)
                    .col(Booking::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_technician")
                    .table(Booking::Table)
                    .col(Booking::TechnicianId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_customer")
                    .table(Booking::Table)
                    .col(Booking::CustomerId)
                    .to_owned(),
            )
            .await?;

        // Address: per-user listing
        manager
            .create_index(
                Index::create()
                    .name("idx_address_user")
                    .table(Address::Table)
                    .col(Address::UserId)
                    .to_owned(),
            )
            .await?;

        // Service: catalog browsing by category
        manager
            .create_index(
                Index::create()
                    .name("idx_service_category")
                    .table(Service::Table)
                    .col(Service::CategoryId)
                    .to_owned(),
            )
            .await?;

        // Technician: verification queue scan
        manager
            .create_index(
                Index::create()
                    .name("idx_technician_verification")
                    .table(Technician::Table)
                    .col(Technician::VerificationStatus)
                    .to_owned(),
            )
            .await?;

        // Category names are unique ignoring case; expression indexes have
        // no typed builder, so this one is raw SQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uniq_category_name_lower ON category (LOWER(name))",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS uniq_category_name_lower")
            .await?;
        manager
            .drop_index(Index::drop().name("idx_technician_verification").table(Technician::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_category").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_address_user").table(Address::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_customer").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_technician").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_status").table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Booking { Table, Status, TechnicianId, CustomerId }

#[derive(DeriveIden)]
enum Address { Table, UserId }

#[derive(DeriveIden)]
enum Service { Table, CategoryId }

#[derive(DeriveIden)]
enum Technician { Table, VerificationStatus }
