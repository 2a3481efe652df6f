use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use models::errors::ModelError;
use services::auth::errors::AuthError;
use services::bookings::errors::BookingError;
use services::errors::ServiceError;

/// Single error shape for every endpoint: a status plus `{"error": message}`.
///
/// Server-side failures keep their detail in the log and answer with a
/// generic body so internals never leak to clients.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
            return (
                self.status,
                Json(serde_json::json!({"error": "internal error"})),
            )
                .into_response();
        }
        (
            self.status,
            Json(serde_json::json!({"error": self.message})),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let status = match &e {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Unauthorized | AuthError::EmailNotVerified => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled(_) => StatusCode::FORBIDDEN,
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        let status = match &e {
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BookingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Model(ModelError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Model(ModelError::Db(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        let status = match &e {
            ModelError::Validation(_) => StatusCode::BAD_REQUEST,
            ModelError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_expected_statuses() {
        let cases = [
            (AuthError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::Conflict, StatusCode::CONFLICT),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::EmailNotVerified, StatusCode::UNAUTHORIZED),
            (
                AuthError::AccountDisabled("Banned".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                AuthError::Repository("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn booking_conflict_maps_to_409() {
        let api = ApiError::from(BookingError::Conflict("booking is no longer available".into()));
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.message, "booking is no longer available");
    }
}
