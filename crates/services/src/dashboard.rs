//! Admin dashboard numbers, aggregated from live rows on every call.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use serde::Serialize;

use models::enums::{BookingStatus, Role, VerificationStatus};
use models::{booking, technician, user};

use crate::errors::ServiceError;

fn db_err(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Db(e.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Sum of `total_amount` over completed bookings.
    pub total_revenue: Decimal,
    pub total_bookings: u64,
    pub jobs_in_progress: u64,
    pub active_technicians: u64,
    pub pending_verifications: u64,
    pub new_registrations_30d: u64,
}

pub async fn stats(db: &DatabaseConnection) -> Result<DashboardStats, ServiceError> {
    let revenue: Option<Option<Decimal>> = booking::Entity::find()
        .select_only()
        .column_as(booking::Column::TotalAmount.sum(), "total")
        .filter(booking::Column::Status.eq(BookingStatus::Completed))
        .into_tuple()
        .one(db)
        .await
        .map_err(db_err)?;

    let total_bookings = booking::Entity::find().count(db).await.map_err(db_err)?;
    let jobs_in_progress = booking::Entity::find()
        .filter(booking::Column::Status.eq(BookingStatus::InProgress))
        .count(db)
        .await
        .map_err(db_err)?;
    let active_technicians = technician::Entity::find()
        .filter(technician::Column::VerificationStatus.eq(VerificationStatus::Approved))
        .count(db)
        .await
        .map_err(db_err)?;
    let pending_verifications = technician::Entity::find()
        .filter(technician::Column::VerificationStatus.eq(VerificationStatus::Pending))
        .count(db)
        .await
        .map_err(db_err)?;

    let cutoff: DateTime<FixedOffset> = (Utc::now() - Duration::days(30)).into();
    let new_registrations_30d = user::Entity::find()
        .filter(user::Column::Role.ne(Role::Admin))
        .filter(user::Column::CreatedAt.gte(cutoff))
        .count(db)
        .await
        .map_err(db_err)?;

    Ok(DashboardStats {
        total_revenue: revenue.flatten().unwrap_or(Decimal::ZERO),
        total_bookings,
        jobs_in_progress,
        active_technicians,
        pending_verifications,
        new_registrations_30d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn stats_reflect_completed_revenue() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;

        // seed one completed and one in-progress booking through plain inserts
        use models::enums::{AccountStatus, Availability};
        use sea_orm::{ActiveModelTrait, Set};
        use uuid::Uuid;
        let now: DateTime<FixedOffset> = Utc::now().into();

        let customer = models::user::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set("Dash Customer".into()),
            email: Set(format!("dash_cust_{}@example.com", Uuid::new_v4())),
            phone: Set(None),
            password_hash: Set("$argon2id$fake".into()),
            role: Set(Role::Customer),
            status: Set(AccountStatus::Active),
            email_confirmed: Set(true),
            verification_token: Set(None),
            token_expires: Set(None),
            reset_token: Set(None),
            reset_token_expires: Set(None),
            profile_image: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;
        let tech_user = models::user::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set("Dash Tech".into()),
            email: Set(format!("dash_tech_{}@example.com", Uuid::new_v4())),
            phone: Set(None),
            password_hash: Set("$argon2id$fake".into()),
            role: Set(Role::Technician),
            status: Set(AccountStatus::Active),
            email_confirmed: Set(true),
            verification_token: Set(None),
            token_expires: Set(None),
            reset_token: Set(None),
            reset_token_expires: Set(None),
            profile_image: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;
        let tech = technician::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(tech_user.id),
            experience_years: Set(1),
            rating_average: Set(Decimal::ZERO),
            total_ratings: Set(0),
            availability: Set(Availability::Available),
            wallet_balance: Set(Decimal::ZERO),
            total_jobs_completed: Set(0),
            verification_status: Set(VerificationStatus::Approved),
            verified_at: Set(Some(now)),
            id_proof: Set(Some("id.png".into())),
            certificate: Set(Some("cert.png".into())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;
        let cat = models::category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Dash Cleaning {}", Uuid::new_v4())),
            description: Set(None),
            is_active: Set(true),
            created_by: Set(customer.id),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&db)
        .await?;
        let offering = models::service::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(cat.id),
            name: Set("Dash Deep Clean".into()),
            description: Set(None),
            fixed_rate: Set(Decimal::new(250000, 2)),
            estimated_duration_hours: Set(Decimal::new(400, 2)),
            image_url: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&db)
        .await?;
        let addr = models::address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(customer.id),
            street: Set("9 Dash Street".into()),
            city: Set("Colombo".into()),
            state: Set("Western".into()),
            postal_code: Set("00500".into()),
            country: Set("Sri Lanka".into()),
            is_default: Set(true),
            created_at: Set(now),
        }
        .insert(&db)
        .await?;

        let mk_booking = |status: BookingStatus, done: Option<DateTime<FixedOffset>>| {
            booking::ActiveModel {
                id: Set(Uuid::new_v4()),
                customer_id: Set(customer.id),
                technician_id: Set(Some(tech.id)),
                service_id: Set(offering.id),
                address_id: Set(addr.id),
                description: Set("dashboard seed".into()),
                reference_image: Set(None),
                booked_at: Set(now),
                preferred_start: Set(now),
                preferred_end: Set((Utc::now() + Duration::hours(2)).into()),
                status: Set(status),
                total_amount: Set(Decimal::new(250000, 2)),
                work_completed_at: Set(done),
                created_at: Set(now),
                updated_at: Set(now),
            }
        };
        mk_booking(BookingStatus::Completed, Some(now)).insert(&db).await?;
        mk_booking(BookingStatus::InProgress, None).insert(&db).await?;

        // lower bounds only: other tests may run against the same database
        let after = stats(&db).await?;
        assert!(after.total_revenue >= Decimal::new(250000, 2));
        assert!(after.total_bookings >= 2);
        assert!(after.jobs_in_progress >= 1);
        assert!(after.active_technicians >= 1);
        assert!(after.new_registrations_30d >= 2);

        models::user::Entity::delete_by_id(customer.id).exec(&db).await?;
        models::service::Entity::delete_by_id(offering.id).exec(&db).await?;
        models::category::Entity::delete_by_id(cat.id).exec(&db).await?;
        models::user::Entity::delete_by_id(tech_user.id).exec(&db).await?;
        Ok(())
    }
}
