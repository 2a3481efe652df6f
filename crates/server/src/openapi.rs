use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

// Wire-shape mirrors for the OpenAPI document. Handlers deserialize
// their own structs; these only feed the schema components.

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    /// "Customer" or "Technician"
    pub role: String,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub client_ip: Option<String>,
}

#[derive(ToSchema)]
pub struct EmailRequestDoc {
    pub email: String,
}

#[derive(ToSchema)]
pub struct ResetPasswordDoc {
    pub token: String,
    pub new_password: String,
}

#[derive(ToSchema)]
pub struct BootstrapAdminDoc {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct UpdateProfileDoc {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(ToSchema)]
pub struct ProfileImageDoc {
    pub url: String,
}

#[derive(ToSchema)]
pub struct NewAddressDoc {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
}

#[derive(ToSchema)]
pub struct NewBookingDoc {
    pub service_id: Uuid,
    pub address_id: Uuid,
    pub description: String,
    pub reference_image: Option<String>,
    pub preferred_start: DateTime<FixedOffset>,
    pub preferred_end: DateTime<FixedOffset>,
}

#[derive(ToSchema)]
pub struct JobStatusDoc {
    /// "InProgress", "Completed" or "Cancelled"
    pub status: String,
}

#[derive(ToSchema)]
pub struct DocumentsDoc {
    pub id_proof: Option<String>,
    pub certificate: Option<String>,
}

#[derive(ToSchema)]
pub struct TechnicianProfileDoc {
    /// "Available", "Busy" or "Offline"
    pub availability: Option<String>,
    pub experience_years: Option<i32>,
}

#[derive(ToSchema)]
pub struct CategoryDoc {
    pub name: String,
    pub description: Option<String>,
}

#[derive(ToSchema)]
pub struct CategoryUpdateDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
pub struct ServiceDoc {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub fixed_rate: Decimal,
    pub estimated_duration_hours: Decimal,
    pub image_url: Option<String>,
}

#[derive(ToSchema)]
pub struct ServiceUpdateDoc {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub fixed_rate: Option<Decimal>,
    pub estimated_duration_hours: Option<Decimal>,
    pub image_url: Option<String>,
}

#[derive(ToSchema)]
pub struct VerifyDoc {
    /// "Approved" or "Rejected"
    pub status: String,
}

#[derive(ToSchema)]
pub struct UserCreateDoc {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    /// "Customer", "Technician" or "Admin"
    pub role: String,
}

#[derive(ToSchema)]
pub struct UserUpdateDoc {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// "Active", "Inactive" or "Banned"
    pub status: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::verify_email,
        crate::routes::auth::login,
        crate::routes::auth::resend_verification,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::auth::bootstrap_admin,
        crate::routes::catalog::list_categories,
        crate::routes::catalog::get_category,
        crate::routes::catalog::category_services,
        crate::routes::catalog::list_services,
        crate::routes::catalog::get_service,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::profile::set_profile_image,
        crate::routes::profile::list_addresses,
        crate::routes::profile::add_address,
        crate::routes::bookings::create,
        crate::routes::bookings::my_bookings,
        crate::routes::bookings::cancel,
        crate::routes::jobs::available_jobs,
        crate::routes::jobs::my_jobs,
        crate::routes::jobs::accept_job,
        crate::routes::jobs::update_job_status,
        crate::routes::jobs::my_profile,
        crate::routes::jobs::update_my_profile,
        crate::routes::jobs::submit_documents,
        crate::routes::admin::create_category,
        crate::routes::admin::update_category,
        crate::routes::admin::delete_category,
        crate::routes::admin::create_service,
        crate::routes::admin::update_service,
        crate::routes::admin::delete_service,
        crate::routes::admin::pending_technicians,
        crate::routes::admin::technician_detail,
        crate::routes::admin::verify_technician,
        crate::routes::admin::list_users,
        crate::routes::admin::create_user,
        crate::routes::admin::update_user,
        crate::routes::admin::delete_user,
        crate::routes::admin::list_bookings,
        crate::routes::admin::dashboard,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            EmailRequestDoc,
            ResetPasswordDoc,
            BootstrapAdminDoc,
            UpdateProfileDoc,
            ProfileImageDoc,
            NewAddressDoc,
            NewBookingDoc,
            JobStatusDoc,
            DocumentsDoc,
            TechnicianProfileDoc,
            CategoryDoc,
            CategoryUpdateDoc,
            ServiceDoc,
            ServiceUpdateDoc,
            VerifyDoc,
            UserCreateDoc,
            UserUpdateDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "catalog"),
        (name = "account"),
        (name = "bookings"),
        (name = "jobs"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
