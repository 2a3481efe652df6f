use std::sync::Arc;

use sea_orm::DatabaseConnection;

use services::auth::repo::SeaOrmAuthRepository;
use services::auth::service::{AuthConfig, AuthService};
use services::bookings::repo::SeaOrmBookingRepository;
use services::bookings::BookingService;

/// Token parameters shared by issuing (login) and verification (middleware).
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: AuthSettings,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth: AuthSettings) -> Self {
        Self { db, auth }
    }

    /// Auth workflows bound to the live database.
    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        AuthService::new(
            Arc::new(SeaOrmAuthRepository::new(self.db.clone())),
            AuthConfig {
                jwt_secret: self.auth.jwt_secret.clone(),
                token_ttl_hours: self.auth.token_ttl_hours,
            },
        )
    }

    /// Booking workflows bound to the live database.
    pub fn booking_service(&self) -> BookingService<SeaOrmBookingRepository> {
        BookingService::new(Arc::new(SeaOrmBookingRepository::new(self.db.clone())))
    }
}
