use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::category;
use models::enums::{AccountStatus, Role, VerificationStatus};
use models::user;
use services::accounts::{self, AdminNewUser};
use services::bookings::views::{self, AdminBookingView};
use services::catalog::{self, OfferingView};
use services::dashboard::{self, DashboardStats};
use services::pagination::Pagination;
use services::technicians::{self, TechnicianProfile, VerificationDetail};

use crate::errors::ApiError;
use crate::middleware::CurrentUser;
use crate::state::ServerState;

#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

// --- categories ---

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[utoipa::path(post, path = "/api/admin/categories", tag = "admin", request_body = crate::openapi::CategoryDoc, responses((status = 201, description = "Category created"), (status = 409, description = "Name already taken (ignoring case)")))]
pub async fn create_category(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<category::Model>), ApiError> {
    let row = catalog::create_category(
        &state.db,
        me.user_id,
        &req.name,
        req.description.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(put, path = "/api/admin/categories/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Category id")), request_body = crate::openapi::CategoryUpdateDoc, responses((status = 200, description = "Category updated"), (status = 404, description = "Unknown category"), (status = 409, description = "Name already taken")))]
pub async fn update_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryUpdateRequest>,
) -> Result<Json<category::Model>, ApiError> {
    let row = catalog::update_category(
        &state.db,
        id,
        req.name.as_deref(),
        req.description.as_deref(),
        req.is_active,
    )
    .await?;
    Ok(Json(row))
}

#[utoipa::path(delete, path = "/api/admin/categories/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Category id")), responses((status = 204, description = "Category deleted"), (status = 409, description = "Category still has services")))]
pub async fn delete_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- services ---

#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub fixed_rate: Decimal,
    pub estimated_duration_hours: Decimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceUpdateRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub fixed_rate: Option<Decimal>,
    pub estimated_duration_hours: Option<Decimal>,
    pub image_url: Option<String>,
}

#[utoipa::path(post, path = "/api/admin/services", tag = "admin", request_body = crate::openapi::ServiceDoc, responses((status = 201, description = "Service created"), (status = 400, description = "Non-positive rate or duration"), (status = 404, description = "Unknown category")))]
pub async fn create_service(
    State(state): State<ServerState>,
    Json(req): Json<ServiceRequest>,
) -> Result<(StatusCode, Json<OfferingView>), ApiError> {
    let row = catalog::create_offering(
        &state.db,
        req.category_id,
        &req.name,
        req.description.as_deref(),
        req.fixed_rate,
        req.estimated_duration_hours,
        req.image_url.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(put, path = "/api/admin/services/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Service id")), request_body = crate::openapi::ServiceUpdateDoc, responses((status = 200, description = "Service updated; existing bookings keep their price"), (status = 404, description = "Unknown service or category")))]
pub async fn update_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ServiceUpdateRequest>,
) -> Result<Json<OfferingView>, ApiError> {
    let row = catalog::update_offering(
        &state.db,
        id,
        req.category_id,
        req.name.as_deref(),
        req.description.as_deref(),
        req.fixed_rate,
        req.estimated_duration_hours,
        req.image_url.as_deref(),
    )
    .await?;
    Ok(Json(row))
}

#[utoipa::path(delete, path = "/api/admin/services/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Service id")), responses((status = 204, description = "Service deleted"), (status = 409, description = "Bookings reference this service")))]
pub async fn delete_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_offering(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- technician verification ---

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub status: VerificationStatus,
}

#[utoipa::path(get, path = "/api/admin/technicians/pending", tag = "admin", responses((status = 200, description = "Applications awaiting a decision, oldest first")))]
pub async fn pending_technicians(
    State(state): State<ServerState>,
) -> Result<Json<Vec<TechnicianProfile>>, ApiError> {
    let rows = technicians::pending_verifications(&state.db).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/api/admin/technicians/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Technician id")), responses((status = 200, description = "Full review sheet with addresses"), (status = 404, description = "Unknown technician")))]
pub async fn technician_detail(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VerificationDetail>, ApiError> {
    let detail = technicians::verification_detail(&state.db, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(put, path = "/api/admin/technicians/{id}/verify", tag = "admin", params(("id" = Uuid, Path, description = "Technician id")), request_body = crate::openapi::VerifyDoc, responses((status = 200, description = "Decision recorded"), (status = 400, description = "Approval without both documents on file"), (status = 404, description = "Unknown technician")))]
pub async fn verify_technician(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<TechnicianProfile>, ApiError> {
    let row = technicians::set_verification(&state.db, id, req.status).await?;
    Ok(Json(row))
}

// --- users ---

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UserCreateRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

#[utoipa::path(get, path = "/api/admin/users", tag = "admin", params(("role" = Option<String>, Query, description = "Filter by role"), ("status" = Option<String>, Query, description = "Filter by account status"), ("search" = Option<String>, Query, description = "Case-insensitive name/e-mail search"), ("page" = Option<u32>, Query, description = "1-based page"), ("per_page" = Option<u32>, Query, description = "Page size, capped at 100")), responses((status = 200, description = "One page of users with the total count")))]
pub async fn list_users(
    State(state): State<ServerState>,
    Query(q): Query<UsersQuery>,
) -> Result<Json<Paged<user::Model>>, ApiError> {
    let page = PageQuery {
        page: q.page,
        per_page: q.per_page,
    }
    .pagination();
    let (items, total) =
        accounts::list_users(&state.db, q.role, q.status, q.search.as_deref(), page).await?;
    Ok(Json(Paged {
        items,
        total,
        page: page.page,
        per_page: page.per_page,
    }))
}

#[utoipa::path(post, path = "/api/admin/users", tag = "admin", request_body = crate::openapi::UserCreateDoc, responses((status = 201, description = "Account created, e-mail pre-confirmed"), (status = 409, description = "E-mail already in use")))]
pub async fn create_user(
    State(state): State<ServerState>,
    Json(req): Json<UserCreateRequest>,
) -> Result<(StatusCode, Json<user::Model>), ApiError> {
    let row = accounts::create_user_by_admin(
        &state.db,
        AdminNewUser {
            full_name: req.full_name,
            email: req.email,
            phone: req.phone,
            password: req.password,
            role: req.role,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(put, path = "/api/admin/users/{id}", tag = "admin", params(("id" = Uuid, Path, description = "User id")), request_body = crate::openapi::UserUpdateDoc, responses((status = 200, description = "Account updated"), (status = 404, description = "Unknown user"), (status = 409, description = "E-mail already in use")))]
pub async fn update_user(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UserUpdateRequest>,
) -> Result<Json<user::Model>, ApiError> {
    let row = accounts::update_user_by_admin(
        &state.db,
        id,
        req.full_name.as_deref(),
        req.phone.as_deref(),
        req.email.as_deref(),
        req.role,
        req.status,
    )
    .await?;
    Ok(Json(row))
}

#[utoipa::path(delete, path = "/api/admin/users/{id}", tag = "admin", params(("id" = Uuid, Path, description = "User id")), responses((status = 204, description = "Account and its dependent rows deleted"), (status = 404, description = "Unknown user")))]
pub async fn delete_user(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    accounts::delete_user(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- bookings board and dashboard ---

#[utoipa::path(get, path = "/api/admin/bookings", tag = "admin", params(("page" = Option<u32>, Query, description = "1-based page"), ("per_page" = Option<u32>, Query, description = "Page size, capped at 100")), responses((status = 200, description = "One page of all bookings with names resolved")))]
pub async fn list_bookings(
    State(state): State<ServerState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Paged<AdminBookingView>>, ApiError> {
    let page = q.pagination();
    let (items, total) = views::admin_bookings(&state.db, page).await?;
    Ok(Json(Paged {
        items,
        total,
        page: page.page,
        per_page: page.per_page,
    }))
}

#[utoipa::path(get, path = "/api/admin/dashboard", tag = "admin", responses((status = 200, description = "Marketplace totals computed from live data")))]
pub async fn dashboard(State(state): State<ServerState>) -> Result<Json<DashboardStats>, ApiError> {
    let stats = dashboard::stats(&state.db).await?;
    Ok(Json(stats))
}
