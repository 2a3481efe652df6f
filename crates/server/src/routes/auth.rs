use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use services::auth::domain::{
    AuthSession, AuthUser, BootstrapAdminInput, LoginInput, RegisterInput, RegisteredAccount,
};

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Token delivery (e-mail) happens outside this system, so the reset
/// token rides the response.
#[derive(Debug, Serialize)]
pub struct ResetTokenResponse {
    pub reset_token: String,
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Account created, verification token issued"), (status = 400, description = "Invalid input"), (status = 409, description = "E-mail already registered")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisteredAccount>), ApiError> {
    let created = state.auth_service().register(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/auth/verify/{token}", tag = "auth", params(("token" = String, Path, description = "One-time verification token")), responses((status = 200, description = "E-mail confirmed"), (status = 400, description = "Token expired"), (status = 404, description = "Unknown token")))]
pub async fn verify_email(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service().confirm_email(&token).await?;
    Ok(Json(MessageResponse {
        message: "e-mail verified".into(),
    }))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Session token issued"), (status = 401, description = "Bad credentials or unverified e-mail"), (status = 403, description = "Account disabled")))]
pub async fn login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(mut input): Json<LoginInput>,
) -> Result<Json<AuthSession>, ApiError> {
    if input.client_ip.is_none() {
        input.client_ip = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());
    }
    let session = state.auth_service().login(input).await?;
    Ok(Json(session))
}

#[utoipa::path(post, path = "/api/auth/resend-verification", tag = "auth", request_body = crate::openapi::EmailRequestDoc, responses((status = 200, description = "Fresh verification token issued"), (status = 404, description = "Unknown e-mail"), (status = 409, description = "E-mail already verified")))]
pub async fn resend_verification(
    State(state): State<ServerState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<RegisteredAccount>, ApiError> {
    let refreshed = state.auth_service().resend_verification(&req.email).await?;
    Ok(Json(refreshed))
}

#[utoipa::path(post, path = "/api/auth/forgot-password", tag = "auth", request_body = crate::openapi::EmailRequestDoc, responses((status = 200, description = "Reset token issued"), (status = 404, description = "Unknown e-mail")))]
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<ResetTokenResponse>, ApiError> {
    let reset_token = state.auth_service().forgot_password(&req.email).await?;
    Ok(Json(ResetTokenResponse { reset_token }))
}

#[utoipa::path(post, path = "/api/auth/reset-password", tag = "auth", request_body = crate::openapi::ResetPasswordDoc, responses((status = 200, description = "Password replaced"), (status = 400, description = "Token expired or weak password"), (status = 404, description = "Unknown token")))]
pub async fn reset_password(
    State(state): State<ServerState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service()
        .reset_password(&req.token, &req.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "password updated".into(),
    }))
}

#[utoipa::path(post, path = "/api/auth/bootstrap-admin", tag = "auth", request_body = crate::openapi::BootstrapAdminDoc, responses((status = 201, description = "First admin created"), (status = 409, description = "An admin already exists")))]
pub async fn bootstrap_admin(
    State(state): State<ServerState>,
    Json(input): Json<BootstrapAdminInput>,
) -> Result<(StatusCode, Json<AuthUser>), ApiError> {
    let admin = state.auth_service().bootstrap_admin(input).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}
