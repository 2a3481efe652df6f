//! Schema migrations, one table per step, ordered so foreign keys
//! always point at tables that already exist.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_user;
mod m20240601_000002_create_admin;
mod m20240601_000003_create_technician;
mod m20240601_000004_create_category;
mod m20240601_000005_create_service;
mod m20240601_000006_create_address;
mod m20240601_000007_create_booking;
mod m20240601_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_user::Migration),
            Box::new(m20240601_000002_create_admin::Migration),
            Box::new(m20240601_000003_create_technician::Migration),
            Box::new(m20240601_000004_create_category::Migration),
            Box::new(m20240601_000005_create_service::Migration),
            Box::new(m20240601_000006_create_address::Migration),
            Box::new(m20240601_000007_create_booking::Migration),
            // indexes go last, after every table they touch
            Box::new(m20240601_000010_add_indexes::Migration),
        ]
    }
}
