//! Business layer on top of the entity crate.
//! - Workflow modules (`auth`, `bookings`) follow a domain/repository/service
//!   split so their logic is testable against in-memory repositories.
//! - Query-style modules (`catalog`, `technicians`, `accounts`, `dashboard`)
//!   are free functions over a `DatabaseConnection`.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod technicians;
pub mod accounts;
pub mod dashboard;
#[cfg(test)]
pub mod test_support;
