use axum::routing::{get, patch, post, put};
use axum::{middleware, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::middleware as guards;
use crate::state::ServerState;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod jobs;
pub mod profile;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Build the full application router: public catalog and auth routes,
/// bearer-protected account/customer/technician routers, the admin
/// router, and the Swagger UI.
pub fn build_router(state: ServerState) -> Router {
    // Public routes: health, auth flows, catalog browsing
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/verify/:token", get(auth::verify_email))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/resend-verification", post(auth::resend_verification))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/bootstrap-admin", post(auth::bootstrap_admin))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/categories/:id", get(catalog::get_category))
        .route("/api/categories/:id/services", get(catalog::category_services))
        .route("/api/services", get(catalog::list_services))
        .route("/api/services/:id", get(catalog::get_service));

    // Any authenticated account
    let account = Router::new()
        .route("/api/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/api/profile/image", patch(profile::set_profile_image))
        .route("/api/addresses", get(profile::list_addresses).post(profile::add_address))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guards::authenticate,
        ));

    // Customer-only booking routes
    let customer = Router::new()
        .route("/api/bookings", post(bookings::create))
        .route("/api/bookings/my", get(bookings::my_bookings))
        .route("/api/bookings/:id/cancel", post(bookings::cancel))
        .route_layer(middleware::from_fn(guards::require_customer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guards::authenticate,
        ));

    // Technician-only job routes
    let technician = Router::new()
        .route("/api/technician/jobs", get(jobs::available_jobs))
        .route("/api/technician/jobs/mine", get(jobs::my_jobs))
        .route("/api/technician/jobs/:id/accept", post(jobs::accept_job))
        .route("/api/technician/jobs/:id/status", patch(jobs::update_job_status))
        .route(
            "/api/technician/profile",
            get(jobs::my_profile).put(jobs::update_my_profile),
        )
        .route("/api/technician/documents", post(jobs::submit_documents))
        .route_layer(middleware::from_fn(guards::require_technician))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guards::authenticate,
        ));

    // Admin-only management routes
    let admin_routes = Router::new()
        .route("/api/admin/categories", post(admin::create_category))
        .route(
            "/api/admin/categories/:id",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/api/admin/services", post(admin::create_service))
        .route(
            "/api/admin/services/:id",
            put(admin::update_service).delete(admin::delete_service),
        )
        .route("/api/admin/technicians/pending", get(admin::pending_technicians))
        .route("/api/admin/technicians/:id", get(admin::technician_detail))
        .route("/api/admin/technicians/:id/verify", put(admin::verify_technician))
        .route("/api/admin/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/api/admin/users/:id",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route_layer(middleware::from_fn(guards::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guards::authenticate,
        ));

    let swagger =
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi());

    // Compose
    public
        .merge(account)
        .merge(customer)
        .merge(technician)
        .merge(admin_routes)
        .merge(swagger)
        .with_state(state)
        .layer(build_cors())
        .layer(
            TraceLayer::new_for_http()
                // one span per request with method and path, at INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // response line carries status and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx and transport failures log at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
