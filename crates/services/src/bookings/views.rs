//! Read-side projections of bookings joined with their related names.
//!
//! Views are assembled in two steps: fetch the booking rows, then resolve
//! related names in batched `IN` lookups keyed by id.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use uuid::Uuid;

use models::enums::BookingStatus;
use models::{address, booking, service, technician, user};

use super::errors::BookingError;
use crate::pagination::Pagination;

/// A customer's own booking with display names resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerBookingView {
    pub id: Uuid,
    pub service_name: String,
    pub technician_name: Option<String>,
    pub status: BookingStatus,
    pub description: String,
    pub total_amount: Decimal,
    pub booked_at: DateTime<FixedOffset>,
    pub preferred_start: DateTime<FixedOffset>,
    pub preferred_end: DateTime<FixedOffset>,
    pub work_completed_at: Option<DateTime<FixedOffset>>,
}

/// A job as technicians see it: who booked, what and where.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: Uuid,
    pub service_name: String,
    pub customer_name: String,
    pub street: String,
    pub city: String,
    pub status: BookingStatus,
    pub description: String,
    pub reference_image: Option<String>,
    pub total_amount: Decimal,
    pub preferred_start: DateTime<FixedOffset>,
    pub preferred_end: DateTime<FixedOffset>,
}

/// Board row for the admin overview.
#[derive(Debug, Clone, Serialize)]
pub struct AdminBookingView {
    pub id: Uuid,
    pub customer_name: String,
    pub technician_name: Option<String>,
    pub service_name: String,
    pub status: BookingStatus,
    pub total_amount: Decimal,
    pub booked_at: DateTime<FixedOffset>,
    pub work_completed_at: Option<DateTime<FixedOffset>>,
}

fn db_err(e: impl std::fmt::Display) -> BookingError {
    BookingError::Repository(e.to_string())
}

async fn service_names(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, String>, BookingError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = service::Entity::find()
        .filter(service::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err)?;
    Ok(rows.into_iter().map(|s| (s.id, s.name)).collect())
}

async fn user_names(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, String>, BookingError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err)?;
    Ok(rows.into_iter().map(|u| (u.id, u.full_name)).collect())
}

/// technician id -> owning user id, for the extra hop to a display name.
async fn technician_owners(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Uuid>, BookingError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = technician::Entity::find()
        .filter(technician::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err)?;
    Ok(rows.into_iter().map(|t| (t.id, t.user_id)).collect())
}

async fn addresses_by_id(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, address::Model>, BookingError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = address::Entity::find()
        .filter(address::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err)?;
    Ok(rows.into_iter().map(|a| (a.id, a)).collect())
}

/// Resolve technician display names for a batch of bookings.
async fn technician_names(
    db: &DatabaseConnection,
    rows: &[booking::Model],
) -> Result<HashMap<Uuid, String>, BookingError> {
    let tech_ids: Vec<Uuid> = rows.iter().filter_map(|b| b.technician_id).collect();
    let owners = technician_owners(db, tech_ids).await?;
    let names = user_names(db, owners.values().copied().collect()).await?;
    Ok(owners
        .into_iter()
        .filter_map(|(tech_id, user_id)| names.get(&user_id).map(|n| (tech_id, n.clone())))
        .collect())
}

pub async fn customer_bookings(
    db: &DatabaseConnection,
    customer_id: Uuid,
) -> Result<Vec<CustomerBookingView>, BookingError> {
    let rows = booking::Entity::find()
        .filter(booking::Column::CustomerId.eq(customer_id))
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_err)?;

    let services = service_names(db, rows.iter().map(|b| b.service_id).collect()).await?;
    let technicians = technician_names(db, &rows).await?;

    Ok(rows
        .into_iter()
        .map(|b| CustomerBookingView {
            id: b.id,
            service_name: services.get(&b.service_id).cloned().unwrap_or_default(),
            technician_name: b.technician_id.and_then(|t| technicians.get(&t).cloned()),
            status: b.status,
            description: b.description,
            total_amount: b.total_amount,
            booked_at: b.booked_at,
            preferred_start: b.preferred_start,
            preferred_end: b.preferred_end,
            work_completed_at: b.work_completed_at,
        })
        .collect())
}

fn to_job_view(
    b: booking::Model,
    services: &HashMap<Uuid, String>,
    customers: &HashMap<Uuid, String>,
    addresses: &HashMap<Uuid, address::Model>,
) -> JobView {
    let (street, city) = addresses
        .get(&b.address_id)
        .map(|a| (a.street.clone(), a.city.clone()))
        .unwrap_or_default();
    JobView {
        id: b.id,
        service_name: services.get(&b.service_id).cloned().unwrap_or_default(),
        customer_name: customers.get(&b.customer_id).cloned().unwrap_or_default(),
        street,
        city,
        status: b.status,
        description: b.description,
        reference_image: b.reference_image,
        total_amount: b.total_amount,
        preferred_start: b.preferred_start,
        preferred_end: b.preferred_end,
    }
}

async fn job_views(
    db: &DatabaseConnection,
    rows: Vec<booking::Model>,
) -> Result<Vec<JobView>, BookingError> {
    let services = service_names(db, rows.iter().map(|b| b.service_id).collect()).await?;
    let customers = user_names(db, rows.iter().map(|b| b.customer_id).collect()).await?;
    let addresses = addresses_by_id(db, rows.iter().map(|b| b.address_id).collect()).await?;
    Ok(rows
        .into_iter()
        .map(|b| to_job_view(b, &services, &customers, &addresses))
        .collect())
}

/// Feed for a technician: every unclaimed pending booking plus their own
/// jobs that are still in flight, soonest preferred start first.
pub async fn available_jobs(
    db: &DatabaseConnection,
    technician_id: Uuid,
) -> Result<Vec<JobView>, BookingError> {
    let rows = booking::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(booking::Column::Status.eq(BookingStatus::Pending))
                        .add(booking::Column::TechnicianId.is_null()),
                )
                .add(
                    Condition::all()
                        .add(booking::Column::TechnicianId.eq(technician_id))
                        .add(booking::Column::Status.is_in([
                            BookingStatus::Accepted,
                            BookingStatus::InProgress,
                        ])),
                ),
        )
        .order_by_asc(booking::Column::PreferredStart)
        .all(db)
        .await
        .map_err(db_err)?;
    job_views(db, rows).await
}

/// Every job ever assigned to the technician, newest first.
pub async fn technician_jobs(
    db: &DatabaseConnection,
    technician_id: Uuid,
) -> Result<Vec<JobView>, BookingError> {
    let rows = booking::Entity::find()
        .filter(booking::Column::TechnicianId.eq(technician_id))
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_err)?;
    job_views(db, rows).await
}

/// Paginated board of all bookings with the page's total row count.
pub async fn admin_bookings(
    db: &DatabaseConnection,
    page: Pagination,
) -> Result<(Vec<AdminBookingView>, u64), BookingError> {
    let (page_idx, per_page) = page.normalize();
    let paginator = booking::Entity::find()
        .order_by_desc(booking::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(db_err)?;
    let rows = paginator.fetch_page(page_idx).await.map_err(db_err)?;

    let services = service_names(db, rows.iter().map(|b| b.service_id).collect()).await?;
    let customers = user_names(db, rows.iter().map(|b| b.customer_id).collect()).await?;
    let technicians = technician_names(db, &rows).await?;

    Ok((
        rows.into_iter()
            .map(|b| AdminBookingView {
                id: b.id,
                customer_name: customers.get(&b.customer_id).cloned().unwrap_or_default(),
                technician_name: b.technician_id.and_then(|t| technicians.get(&t).cloned()),
                service_name: services.get(&b.service_id).cloned().unwrap_or_default(),
                status: b.status,
                total_amount: b.total_amount,
                booked_at: b.booked_at,
                work_completed_at: b.work_completed_at,
            })
            .collect(),
        total,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::Utc;
    use models::enums::{AccountStatus, Availability, Role, VerificationStatus};
    use models::category;
    use sea_orm::ActiveValue::Set;
    use sea_orm::ActiveModelTrait;

    #[tokio::test]
    async fn feed_shows_unclaimed_and_own_active_jobs() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let now: DateTime<FixedOffset> = Utc::now().into();

        let mk_user = |email: &str, role: Role| user::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set("View Test".into()),
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
        };
        let salt = Uuid::new_v4();
        let customer = mk_user(&format!("views_c_{salt}@example.com"), Role::Customer).insert(&db).await?;
        let tech_user = mk_user(&format!("views_t_{salt}@example.com"), Role::Technician).insert(&db).await?;
        let other_user = mk_user(&format!("views_o_{salt}@example.com"), Role::Technician).insert(&db).await?;

        let mk_technician = |user_id: Uuid| technician::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            experience_years: Set(1),
            rating_average: Set(Decimal::ZERO),
            total_ratings: Set(0),
            availability: Set(Availability::Available),
            wallet_balance: Set(Decimal::ZERO),
            total_jobs_completed: Set(0),
            verification_status: Set(VerificationStatus::Approved),
            verified_at: Set(Some(now)),
            id_proof: Set(None),
            certificate: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let me = mk_technician(tech_user.id).insert(&db).await?;
        let rival = mk_technician(other_user.id).insert(&db).await?;

        let cat = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Views Electrical {salt}")),
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
            name: Set("Views Rewiring".into()),
            description: Set(None),
            fixed_rate: Set(Decimal::new(120000, 2)),
            estimated_duration_hours: Set(Decimal::new(300, 2)),
            image_url: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&db)
        .await?;
        let addr = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(customer.id),
            street: Set("7 Lake Drive".into()),
            city: Set("Kandy".into()),
            state: Set("Central".into()),
            postal_code: Set("20000".into()),
            country: Set("Sri Lanka".into()),
            is_default: Set(true),
            created_at: Set(now),
        }
        .insert(&db)
        .await?;

        let mk_booking = |status: BookingStatus, tech: Option<Uuid>| booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer.id),
            technician_id: Set(tech),
            service_id: Set(offering.id),
            address_id: Set(addr.id),
            description: Set("rewire garage".into()),
            reference_image: Set(None),
            booked_at: Set(now),
            preferred_start: Set(now),
            preferred_end: Set((Utc::now() + chrono::Duration::hours(2)).into()),
            status: Set(status),
            total_amount: Set(Decimal::new(120000, 2)),
            work_completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let open = mk_booking(BookingStatus::Pending, None).insert(&db).await?;
        let mine = mk_booking(BookingStatus::InProgress, Some(me.id)).insert(&db).await?;
        let rivals = mk_booking(BookingStatus::Accepted, Some(rival.id)).insert(&db).await?;
        let finished = mk_booking(BookingStatus::Completed, Some(me.id)).insert(&db).await?;

        let feed = available_jobs(&db, me.id).await?;
        let feed_ids: Vec<Uuid> = feed.iter().map(|j| j.id).collect();
        assert!(feed_ids.contains(&open.id));
        assert!(feed_ids.contains(&mine.id));
        assert!(!feed_ids.contains(&rivals.id));
        assert!(!feed_ids.contains(&finished.id));
        let open_view = feed.iter().find(|j| j.id == open.id).expect("open job");
        assert_eq!(open_view.service_name, "Views Rewiring");
        assert_eq!(open_view.city, "Kandy");

        let history = technician_jobs(&db, me.id).await?;
        let history_ids: Vec<Uuid> = history.iter().map(|j| j.id).collect();
        assert!(history_ids.contains(&mine.id));
        assert!(history_ids.contains(&finished.id));
        assert!(!history_ids.contains(&open.id));

        let my_bookings = customer_bookings(&db, customer.id).await?;
        assert_eq!(my_bookings.len(), 4);
        let claimed = my_bookings.iter().find(|b| b.id == mine.id).expect("claimed");
        assert_eq!(claimed.technician_name.as_deref(), Some("View Test"));

        user::Entity::delete_by_id(customer.id).exec(&db).await?;
        service::Entity::delete_by_id(offering.id).exec(&db).await?;
        category::Entity::delete_by_id(cat.id).exec(&db).await?;
        user::Entity::delete_by_id(tech_user.id).exec(&db).await?;
        user::Entity::delete_by_id(other_user.id).exec(&db).await?;
        Ok(())
    }
}
