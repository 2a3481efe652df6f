//! SeaORM-backed implementation of [`BookingRepository`].
//!
//! Claiming and status changes are single conditional UPDATE statements;
//! `rows_affected` tells whether this call won the race.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use models::enums::BookingStatus;
use models::{address, booking, service, technician};

use crate::bookings::errors::BookingError;
use crate::bookings::repository::BookingRepository;

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn db_err(e: impl std::fmt::Display) -> BookingError {
    BookingError::Repository(e.to_string())
}

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn find(&self, id: Uuid) -> Result<Option<booking::Model>, BookingError> {
        booking::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)
    }

    async fn insert(&self, row: booking::Model) -> Result<booking::Model, BookingError> {
        booking::ActiveModel {
            id: Set(row.id),
            customer_id: Set(row.customer_id),
            technician_id: Set(row.technician_id),
            service_id: Set(row.service_id),
            address_id: Set(row.address_id),
            description: Set(row.description),
            reference_image: Set(row.reference_image),
            booked_at: Set(row.booked_at),
            preferred_start: Set(row.preferred_start),
            preferred_end: Set(row.preferred_end),
            status: Set(row.status),
            total_amount: Set(row.total_amount),
            work_completed_at: Set(row.work_completed_at),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)
    }

    async fn claim_pending(&self, id: Uuid, technician_id: Uuid) -> Result<bool, BookingError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let res = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(BookingStatus::Accepted))
            .col_expr(booking::Column::TechnicianId, Expr::value(technician_id))
            .col_expr(booking::Column::UpdatedAt, Expr::value(now))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(BookingStatus::Pending))
            .filter(booking::Column::TechnicianId.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected == 1)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        completed_at: Option<DateTime<FixedOffset>>,
    ) -> Result<bool, BookingError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut update = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(next))
            .col_expr(booking::Column::UpdatedAt, Expr::value(now));
        if let Some(at) = completed_at {
            update = update.col_expr(booking::Column::WorkCompletedAt, Expr::value(at));
        }
        let res = update
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(expected))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected == 1)
    }

    async fn offering_rate(&self, service_id: Uuid) -> Result<Option<Decimal>, BookingError> {
        let found = service::Entity::find_by_id(service_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(|s| s.fixed_rate))
    }

    async fn address_owner(&self, address_id: Uuid) -> Result<Option<Uuid>, BookingError> {
        let found = address::Entity::find_by_id(address_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(|a| a.user_id))
    }

    async fn bump_completed_jobs(&self, technician_id: Uuid) -> Result<(), BookingError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        technician::Entity::update_many()
            .col_expr(
                technician::Column::TotalJobsCompleted,
                Expr::col(technician::Column::TotalJobsCompleted).add(1),
            )
            .col_expr(technician::Column::UpdatedAt, Expr::value(now))
            .filter(technician::Column::Id.eq(technician_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::enums::{AccountStatus, Availability, Role, VerificationStatus};
    use models::{category, user};

    async fn seed_user(
        db: &DatabaseConnection,
        role: Role,
        email: &str,
    ) -> anyhow::Result<user::Model> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Ok(user::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set("Claim Test".into()),
            email: Set(email.into()),
            phone: Set(None),
            password_hash: Set("$argon2id$fake".into()),
            role: Set(role),
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
        .insert(db)
        .await?)
    }

    async fn seed_technician(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> anyhow::Result<technician::Model> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Ok(technician::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            experience_years: Set(2),
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
        .insert(db)
        .await?)
    }

    #[tokio::test]
    async fn conditional_claim_admits_one_winner() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let now: DateTime<FixedOffset> = Utc::now().into();

        let salt = Uuid::new_v4();
        let customer = seed_user(&db, Role::Customer, &format!("claim_c_{salt}@example.com")).await?;
        let tech_a_user = seed_user(&db, Role::Technician, &format!("claim_a_{salt}@example.com")).await?;
        let tech_b_user = seed_user(&db, Role::Technician, &format!("claim_b_{salt}@example.com")).await?;
        let tech_a = seed_technician(&db, tech_a_user.id).await?;
        let tech_b = seed_technician(&db, tech_b_user.id).await?;

        let cat = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Claim Plumbing {salt}")),
            description: Set(None),
            is_active: Set(true),
            created_by: Set(customer.id),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&db)
        .await?;
        let offering = service::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(cat.id),
            name: Set("Claim Pipe Fix".into()),
            description: Set(None),
            fixed_rate: Set(Decimal::new(450000, 2)),
            estimated_duration_hours: Set(Decimal::new(200, 2)),
            image_url: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&db)
        .await?;
        let addr = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(customer.id),
            street: Set("12 Galle Road".into()),
            city: Set("Colombo".into()),
            state: Set("Western".into()),
            postal_code: Set("00300".into()),
            country: Set("Sri Lanka".into()),
            is_default: Set(true),
            created_at: Set(now),
        }
        .insert(&db)
        .await?;

        let repo = SeaOrmBookingRepository::new(db.clone());
        let row = repo
            .insert(booking::Model {
                id: Uuid::new_v4(),
                customer_id: customer.id,
                technician_id: None,
                service_id: offering.id,
                address_id: addr.id,
                description: "water heater install".into(),
                reference_image: None,
                booked_at: now,
                preferred_start: now,
                preferred_end: (Utc::now() + chrono::Duration::hours(2)).into(),
                status: BookingStatus::Pending,
                total_amount: Decimal::new(450000, 2),
                work_completed_at: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        // first claim wins, second hits zero affected rows
        assert!(repo.claim_pending(row.id, tech_a.id).await?);
        assert!(!repo.claim_pending(row.id, tech_b.id).await?);
        let claimed = repo.find(row.id).await?.expect("row");
        assert_eq!(claimed.status, BookingStatus::Accepted);
        assert_eq!(claimed.technician_id, Some(tech_a.id));

        // stale-expected transitions do not fire
        assert!(!repo.transition(row.id, BookingStatus::Pending, BookingStatus::Cancelled, None).await?);
        let after = repo.find(row.id).await?.expect("row");
        assert_eq!(after.status, BookingStatus::Accepted);

        assert!(repo.transition(row.id, BookingStatus::Accepted, BookingStatus::InProgress, None).await?);
        let done_at: DateTime<FixedOffset> = Utc::now().into();
        assert!(repo
            .transition(row.id, BookingStatus::InProgress, BookingStatus::Completed, Some(done_at))
            .await?);
        let finished = repo.find(row.id).await?.expect("row");
        assert_eq!(finished.status, BookingStatus::Completed);
        assert!(finished.work_completed_at.is_some());

        repo.bump_completed_jobs(tech_a.id).await?;
        let bumped = technician::Entity::find_by_id(tech_a.id)
            .one(&db)
            .await?
            .expect("technician");
        assert_eq!(bumped.total_jobs_completed, 1);

        // rate and ownership lookups used by the service layer
        assert_eq!(repo.offering_rate(offering.id).await?, Some(Decimal::new(450000, 2)));
        assert_eq!(repo.address_owner(addr.id).await?, Some(customer.id));

        // cleanup: bookings and addresses go with their users; the offering
        // is restricted while a booking references it
        user::Entity::delete_by_id(customer.id).exec(&db).await?;
        service::Entity::delete_by_id(offering.id).exec(&db).await?;
        category::Entity::delete_by_id(cat.id).exec(&db).await?;
        user::Entity::delete_by_id(tech_a_user.id).exec(&db).await?;
        user::Entity::delete_by_id(tech_b_user.id).exec(&db).await?;
        Ok(())
    }
}
