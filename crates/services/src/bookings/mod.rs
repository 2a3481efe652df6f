//! Booking lifecycle: creation by customers, atomic claiming by verified
//! technicians and the conditional status walk to completion.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;
pub mod views;

pub use service::BookingService;
