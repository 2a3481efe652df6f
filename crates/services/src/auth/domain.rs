use chrono::{DateTime, FixedOffset};
use models::enums::{AccountStatus, Role, VerificationStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration input; `role` may be Customer or Technician, never Admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
}

/// Login input. `client_ip` is recorded for admin logins only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub client_ip: Option<String>,
}

/// First-admin bootstrap input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdminInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Domain user (business view); never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub email_confirmed: bool,
    pub profile_image: Option<String>,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
}

/// A freshly registered account together with its e-mail verification
/// token. Delivery is out of scope here, so the token rides the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredAccount {
    pub user: AuthUser,
    pub verification_token: String,
    pub token_expires: DateTime<FixedOffset>,
}

/// Login result. `verification_status` is populated for technicians so
/// clients can surface the gate state immediately after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
    pub verification_status: Option<VerificationStatus>,
}

/// Owner and expiry of a stored one-time token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenState {
    pub user_id: Uuid,
    pub expires: Option<DateTime<FixedOffset>>,
}

/// Record handed to the repository when an account is created.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub email_confirmed: bool,
    pub verification_token: Option<String>,
    pub token_expires: Option<DateTime<FixedOffset>>,
}

/// JWT claims; the one shape both issuing and verification use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: Uuid,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}
