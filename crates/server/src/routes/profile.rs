use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use models::{address, user};
use services::accounts;

use crate::errors::ApiError;
use crate::middleware::CurrentUser;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileImageRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct NewAddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
}

#[utoipa::path(get, path = "/api/profile", tag = "account", responses((status = 200, description = "Caller's account"), (status = 401, description = "Missing or invalid token")))]
pub async fn get_profile(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Json<user::Model>, ApiError> {
    let row = accounts::get_profile(&state.db, me.user_id).await?;
    Ok(Json(row))
}

#[utoipa::path(put, path = "/api/profile", tag = "account", request_body = crate::openapi::UpdateProfileDoc, responses((status = 200, description = "Updated account"), (status = 400, description = "Invalid input")))]
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<user::Model>, ApiError> {
    let row = accounts::update_profile(
        &state.db,
        me.user_id,
        req.full_name.as_deref(),
        req.phone.as_deref(),
    )
    .await?;
    Ok(Json(row))
}

#[utoipa::path(patch, path = "/api/profile/image", tag = "account", request_body = crate::openapi::ProfileImageDoc, responses((status = 200, description = "Updated account"), (status = 400, description = "Empty url")))]
pub async fn set_profile_image(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Json(req): Json<ProfileImageRequest>,
) -> Result<Json<user::Model>, ApiError> {
    let row = accounts::set_profile_image(&state.db, me.user_id, &req.url).await?;
    Ok(Json(row))
}

#[utoipa::path(get, path = "/api/addresses", tag = "account", responses((status = 200, description = "Caller's addresses, default first")))]
pub async fn list_addresses(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Json<Vec<address::Model>>, ApiError> {
    let rows = accounts::list_addresses(&state.db, me.user_id).await?;
    Ok(Json(rows))
}

#[utoipa::path(post, path = "/api/addresses", tag = "account", request_body = crate::openapi::NewAddressDoc, responses((status = 201, description = "Address stored; first address becomes the default"), (status = 400, description = "Missing street or city")))]
pub async fn add_address(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Json(req): Json<NewAddressRequest>,
) -> Result<(StatusCode, Json<address::Model>), ApiError> {
    let input = address::NewAddress {
        street: req.street,
        city: req.city,
        state: req.state,
        postal_code: req.postal_code,
        country: req.country,
    };
    let row = accounts::add_address(&state.db, me.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}
