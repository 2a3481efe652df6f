use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::booking;
use models::enums::{Availability, BookingStatus};
use services::bookings::views::{self, JobView};
use services::technicians::{self, TechnicianProfile};

use crate::errors::ApiError;
use crate::middleware::CurrentUser;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct JobStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize)]
pub struct DocumentsRequest {
    pub id_proof: Option<String>,
    pub certificate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TechnicianProfileRequest {
    pub availability: Option<Availability>,
    pub experience_years: Option<i32>,
}

#[utoipa::path(get, path = "/api/technician/jobs", tag = "jobs", responses((status = 200, description = "Unclaimed bookings plus the caller's active jobs"), (status = 404, description = "Caller has no technician profile")))]
pub async fn available_jobs(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Json<Vec<JobView>>, ApiError> {
    let gate = technicians::gate_for_user(&state.db, me.user_id).await?;
    let rows = views::available_jobs(&state.db, gate.technician_id).await?;
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/api/technician/jobs/mine", tag = "jobs", responses((status = 200, description = "Every job assigned to the caller, newest first")))]
pub async fn my_jobs(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Json<Vec<JobView>>, ApiError> {
    let gate = technicians::gate_for_user(&state.db, me.user_id).await?;
    let rows = views::technician_jobs(&state.db, gate.technician_id).await?;
    Ok(Json(rows))
}

#[utoipa::path(post, path = "/api/technician/jobs/{id}/accept", tag = "jobs", params(("id" = Uuid, Path, description = "Booking id")), responses((status = 200, description = "Job assigned to the caller"), (status = 403, description = "Caller is not verified"), (status = 409, description = "Another technician claimed it first")))]
pub async fn accept_job(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<booking::Model>, ApiError> {
    let gate = technicians::gate_for_user(&state.db, me.user_id).await?;
    let row = state.booking_service().claim(gate, id).await?;
    Ok(Json(row))
}

#[utoipa::path(patch, path = "/api/technician/jobs/{id}/status", tag = "jobs", params(("id" = Uuid, Path, description = "Booking id")), request_body = crate::openapi::JobStatusDoc, responses((status = 200, description = "Status advanced"), (status = 404, description = "Job not assigned to the caller"), (status = 409, description = "Transition not allowed from the current status")))]
pub async fn update_job_status(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobStatusRequest>,
) -> Result<Json<booking::Model>, ApiError> {
    let gate = technicians::gate_for_user(&state.db, me.user_id).await?;
    let row = state
        .booking_service()
        .update_status(gate, id, req.status)
        .await?;
    Ok(Json(row))
}

#[utoipa::path(get, path = "/api/technician/profile", tag = "jobs", responses((status = 200, description = "Caller's technician profile"), (status = 404, description = "Caller has no technician profile")))]
pub async fn my_profile(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Json<TechnicianProfile>, ApiError> {
    let profile = technicians::profile_for_user(&state.db, me.user_id).await?;
    Ok(Json(profile))
}

#[utoipa::path(put, path = "/api/technician/profile", tag = "jobs", request_body = crate::openapi::TechnicianProfileDoc, responses((status = 200, description = "Profile updated"), (status = 400, description = "Experience out of range")))]
pub async fn update_my_profile(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Json(req): Json<TechnicianProfileRequest>,
) -> Result<Json<TechnicianProfile>, ApiError> {
    let profile = technicians::update_profile(
        &state.db,
        me.user_id,
        req.availability,
        req.experience_years,
    )
    .await?;
    Ok(Json(profile))
}

#[utoipa::path(post, path = "/api/technician/documents", tag = "jobs", request_body = crate::openapi::DocumentsDoc, responses((status = 200, description = "Document references stored"), (status = 404, description = "Caller has no technician profile")))]
pub async fn submit_documents(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Json(req): Json<DocumentsRequest>,
) -> Result<Json<TechnicianProfile>, ApiError> {
    let profile = technicians::submit_documents(
        &state.db,
        me.user_id,
        req.id_proof.as_deref(),
        req.certificate.as_deref(),
    )
    .await?;
    Ok(Json(profile))
}
