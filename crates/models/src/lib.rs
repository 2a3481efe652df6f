pub mod errors;
pub mod db;
pub mod enums;
pub mod validation;
pub mod user;
pub mod technician;
pub mod admin;
pub mod category;
pub mod service;
pub mod address;
pub mod booking;
