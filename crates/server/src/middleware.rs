use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::warn;
use uuid::Uuid;

use models::enums::Role;
use services::auth::domain::Claims;

use crate::errors::ApiError;
use crate::state::ServerState;

/// Authenticated caller, placed in request extensions by [`authenticate`]
/// and read back by handlers and the role guards below.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Bearer-token check for the protected routers. Decodes the JWT, then
/// stores a [`CurrentUser`] so downstream layers never re-parse the token.
pub async fn authenticate(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("authorization header is not a bearer token"))?;

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256)).map_err(|e| {
        warn!(error = %e, "token rejected");
        ApiError::unauthorized("invalid or expired token")
    })?;

    let claims = data.claims;
    req.extensions_mut().insert(CurrentUser {
        user_id: claims.uid,
        email: claims.sub,
        role: claims.role,
    });
    Ok(next.run(req).await)
}

fn current_user(req: &Request) -> Result<&CurrentUser, ApiError> {
    req.extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))
}

/// Restricts a router to admin accounts. Runs after [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    if current_user(&req)?.role != Role::Admin {
        return Err(ApiError::forbidden("admin access required"));
    }
    Ok(next.run(req).await)
}

/// Restricts a router to technician accounts. Runs after [`authenticate`].
pub async fn require_technician(req: Request, next: Next) -> Result<Response, ApiError> {
    if current_user(&req)?.role != Role::Technician {
        return Err(ApiError::forbidden("technician access required"));
    }
    Ok(next.run(req).await)
}

/// Restricts a router to customer accounts. Runs after [`authenticate`].
pub async fn require_customer(req: Request, next: Next) -> Result<Response, ApiError> {
    if current_user(&req)?.role != Role::Customer {
        return Err(ApiError::forbidden("customer access required"));
    }
    Ok(next.run(req).await)
}
