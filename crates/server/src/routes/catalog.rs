use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use models::category;
use services::catalog::{self, OfferingView};

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct ServicesQuery {
    pub category_id: Option<Uuid>,
}

#[utoipa::path(get, path = "/api/categories", tag = "catalog", responses((status = 200, description = "Active categories, alphabetical")))]
pub async fn list_categories(
    State(state): State<ServerState>,
) -> Result<Json<Vec<category::Model>>, ApiError> {
    let rows = catalog::list_categories(&state.db, false).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/api/categories/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Category id")), responses((status = 200, description = "One category"), (status = 404, description = "Unknown category")))]
pub async fn get_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<category::Model>, ApiError> {
    let row = catalog::get_category(&state.db, id).await?;
    Ok(Json(row))
}

#[utoipa::path(get, path = "/api/categories/{id}/services", tag = "catalog", params(("id" = Uuid, Path, description = "Category id")), responses((status = 200, description = "Services in the category"), (status = 404, description = "Unknown category")))]
pub async fn category_services(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OfferingView>>, ApiError> {
    catalog::get_category(&state.db, id).await?;
    let rows = catalog::list_offerings(&state.db, Some(id)).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/api/services", tag = "catalog", params(("category_id" = Option<Uuid>, Query, description = "Narrow to one category")), responses((status = 200, description = "All services with category names")))]
pub async fn list_services(
    State(state): State<ServerState>,
    Query(q): Query<ServicesQuery>,
) -> Result<Json<Vec<OfferingView>>, ApiError> {
    let rows = catalog::list_offerings(&state.db, q.category_id).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/api/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Service id")), responses((status = 200, description = "One service"), (status = 404, description = "Unknown service")))]
pub async fn get_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OfferingView>, ApiError> {
    let row = catalog::get_offering(&state.db, id).await?;
    Ok(Json(row))
}
