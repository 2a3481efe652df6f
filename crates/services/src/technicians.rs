//! Technician profiles and the verification workflow.
//!
//! Job endpoints never trust a cached verification flag: they resolve the
//! gate from the store on every call via [`gate_for_user`].

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use models::enums::{Availability, VerificationStatus};
use models::{address, technician, user};

use crate::bookings::domain::TechnicianGate;
use crate::errors::ServiceError;

fn db_err(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Db(e.to_string())
}

/// Fresh verification gate for the calling user.
pub async fn gate_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<TechnicianGate, ServiceError> {
    technician::find_by_user(db, user_id)
        .await?
        .map(|t| TechnicianGate { technician_id: t.id, verification: t.verification_status })
        .ok_or_else(|| ServiceError::not_found("technician profile"))
}

/// Combined account and technician fields for profile screens.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicianProfile {
    pub technician_id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub experience_years: i32,
    pub rating_average: Decimal,
    pub total_ratings: i32,
    pub availability: Availability,
    pub wallet_balance: Decimal,
    pub total_jobs_completed: i32,
    pub verification_status: VerificationStatus,
    pub verified_at: Option<DateTime<FixedOffset>>,
    pub id_proof: Option<String>,
    pub certificate: Option<String>,
}

fn combine(u: user::Model, t: technician::Model) -> TechnicianProfile {
    TechnicianProfile {
        technician_id: t.id,
        user_id: u.id,
        full_name: u.full_name,
        email: u.email,
        phone: u.phone,
        experience_years: t.experience_years,
        rating_average: t.rating_average,
        total_ratings: t.total_ratings,
        availability: t.availability,
        wallet_balance: t.wallet_balance,
        total_jobs_completed: t.total_jobs_completed,
        verification_status: t.verification_status,
        verified_at: t.verified_at,
        id_proof: t.id_proof,
        certificate: t.certificate,
    }
}

async fn load_pair(
    db: &DatabaseConnection,
    t: technician::Model,
) -> Result<TechnicianProfile, ServiceError> {
    let u = user::Entity::find_by_id(t.user_id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    Ok(combine(u, t))
}

pub async fn profile_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<TechnicianProfile, ServiceError> {
    let t = technician::find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("technician profile"))?;
    load_pair(db, t).await
}

/// Record uploaded document references; files themselves live outside
/// this system.
pub async fn submit_documents(
    db: &DatabaseConnection,
    user_id: Uuid,
    id_proof: Option<&str>,
    certificate: Option<&str>,
) -> Result<TechnicianProfile, ServiceError> {
    let t = technician::find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("technician profile"))?;
    let technician_id = t.id;
    let mut am: technician::ActiveModel = t.into();
    if let Some(p) = id_proof {
        am.id_proof = Set(Some(p.to_string()));
    }
    if let Some(c) = certificate {
        am.certificate = Set(Some(c.to_string()));
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(db_err)?;
    info!(technician = %technician_id, "documents_submitted");
    load_pair(db, updated).await
}

/// Self-service profile fields technicians may edit.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    availability: Option<Availability>,
    experience_years: Option<i32>,
) -> Result<TechnicianProfile, ServiceError> {
    let t = technician::find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("technician profile"))?;
    let mut am: technician::ActiveModel = t.into();
    if let Some(a) = availability {
        am.availability = Set(a);
    }
    if let Some(years) = experience_years {
        if !(0..=80).contains(&years) {
            return Err(ServiceError::Validation("experience_years out of range".into()));
        }
        am.experience_years = Set(years);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(db_err)?;
    load_pair(db, updated).await
}

/// Technicians awaiting an admin decision, oldest application first.
pub async fn pending_verifications(
    db: &DatabaseConnection,
) -> Result<Vec<TechnicianProfile>, ServiceError> {
    let rows = technician::Entity::find()
        .filter(technician::Column::VerificationStatus.eq(VerificationStatus::Pending))
        .order_by_asc(technician::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_err)?;
    let mut out = Vec::with_capacity(rows.len());
    for t in rows {
        out.push(load_pair(db, t).await?);
    }
    Ok(out)
}

/// Full review sheet for one application: profile plus the applicant's
/// addresses.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationDetail {
    #[serde(flatten)]
    pub profile: TechnicianProfile,
    pub addresses: Vec<address::Model>,
}

pub async fn verification_detail(
    db: &DatabaseConnection,
    technician_id: Uuid,
) -> Result<VerificationDetail, ServiceError> {
    let t = technician::Entity::find_by_id(technician_id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("technician"))?;
    let profile = load_pair(db, t).await?;
    let addresses = address::list_for_user(db, profile.user_id).await?;
    Ok(VerificationDetail { profile, addresses })
}

/// Admin decision on a technician application. Approval requires both
/// documents on file; any other outcome clears `verified_at`.
pub async fn set_verification(
    db: &DatabaseConnection,
    technician_id: Uuid,
    next: VerificationStatus,
) -> Result<TechnicianProfile, ServiceError> {
    let t = technician::Entity::find_by_id(technician_id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("technician"))?;
    if next == VerificationStatus::Approved && (t.id_proof.is_none() || t.certificate.is_none()) {
        return Err(ServiceError::Validation(
            "cannot approve: technician has not uploaded both ID proof and certificate".into(),
        ));
    }
    let mut am: technician::ActiveModel = t.into();
    am.verification_status = Set(next);
    am.verified_at = Set(match next {
        VerificationStatus::Approved => Some(Utc::now().into()),
        _ => None,
    });
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(db_err)?;
    info!(technician = %technician_id, status = ?next, "verification_updated");
    load_pair(db, updated).await
}
