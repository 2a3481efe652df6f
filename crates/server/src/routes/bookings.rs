use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use models::booking;
use services::bookings::domain::NewBooking;
use services::bookings::views::{self, CustomerBookingView};

use crate::errors::ApiError;
use crate::middleware::CurrentUser;
use crate::state::ServerState;

#[utoipa::path(post, path = "/api/bookings", tag = "bookings", request_body = crate::openapi::NewBookingDoc, responses((status = 201, description = "Booking created at the service's fixed rate"), (status = 400, description = "Invalid window or foreign address"), (status = 404, description = "Unknown service or address")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Json(input): Json<NewBooking>,
) -> Result<(StatusCode, Json<booking::Model>), ApiError> {
    let created = state.booking_service().create(me.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/bookings/my", tag = "bookings", responses((status = 200, description = "Caller's bookings, newest first")))]
pub async fn my_bookings(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Json<Vec<CustomerBookingView>>, ApiError> {
    let rows = views::customer_bookings(&state.db, me.user_id).await?;
    Ok(Json(rows))
}

#[utoipa::path(post, path = "/api/bookings/{id}/cancel", tag = "bookings", params(("id" = Uuid, Path, description = "Booking id")), responses((status = 200, description = "Booking cancelled"), (status = 404, description = "Not the caller's booking"), (status = 409, description = "Work already started")))]
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<booking::Model>, ApiError> {
    let row = state
        .booking_service()
        .cancel_by_customer(me.user_id, id)
        .await?;
    Ok(Json(row))
}
