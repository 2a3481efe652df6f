//! Account profiles, delivery addresses and admin user management.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use models::enums::{AccountStatus, AdminLevel, Availability, Role, VerificationStatus};
use models::validation;
use models::{address, admin, technician, user};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

fn db_err(e: impl std::fmt::Display) -> ServiceError {
    let msg = e.to_string();
    if msg.contains("duplicate key") {
        ServiceError::Conflict("e-mail is already in use".into())
    } else {
        ServiceError::Db(msg)
    }
}

pub async fn get_profile(db: &DatabaseConnection, user_id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("user"))
}

/// Self-service profile edit: display name and phone only.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    full_name: Option<&str>,
    phone: Option<&str>,
) -> Result<user::Model, ServiceError> {
    let existing = get_profile(db, user_id).await?;
    let mut am: user::ActiveModel = existing.into();
    if let Some(name) = full_name {
        if !validation::valid_full_name(name) {
            return Err(ServiceError::Validation("full name is required".into()));
        }
        am.full_name = Set(name.trim().to_string());
    }
    if let Some(p) = phone {
        am.phone = Set(Some(p.trim().to_string()));
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(db_err)
}

pub async fn set_profile_image(
    db: &DatabaseConnection,
    user_id: Uuid,
    url: &str,
) -> Result<user::Model, ServiceError> {
    if url.trim().is_empty() {
        return Err(ServiceError::Validation("image url is required".into()));
    }
    let existing = get_profile(db, user_id).await?;
    let mut am: user::ActiveModel = existing.into();
    am.profile_image = Set(Some(url.trim().to_string()));
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(db_err)
}

pub async fn list_addresses(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<address::Model>, ServiceError> {
    Ok(address::list_for_user(db, user_id).await?)
}

/// Add a delivery address; a user's first address becomes the default.
pub async fn add_address(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: address::NewAddress,
) -> Result<address::Model, ServiceError> {
    let existing = address::list_for_user(db, user_id).await?;
    let created = address::create(db, user_id, input, existing.is_empty()).await?;
    info!(user = %user_id, address = %created.id, "address_added");
    Ok(created)
}

/// Admin listing with role/status filters and a case-insensitive search
/// over name and e-mail.
pub async fn list_users(
    db: &DatabaseConnection,
    role: Option<Role>,
    status: Option<AccountStatus>,
    search: Option<&str>,
    page: Pagination,
) -> Result<(Vec<user::Model>, u64), ServiceError> {
    let mut finder = user::Entity::find().order_by_desc(user::Column::CreatedAt);
    if let Some(r) = role {
        finder = finder.filter(user::Column::Role.eq(r));
    }
    if let Some(s) = status {
        finder = finder.filter(user::Column::Status.eq(s));
    }
    if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
        let needle = format!("%{}%", q.to_lowercase());
        finder = finder.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(user::Column::FullName)))
                        .like(needle.clone()),
                )
                .add(Expr::expr(Func::lower(Expr::col(user::Column::Email))).like(needle)),
        );
    }
    let (page_idx, per_page) = page.normalize();
    let paginator = finder.paginate(db, per_page);
    let total = paginator.num_items().await.map_err(db_err)?;
    let rows = paginator.fetch_page(page_idx).await.map_err(db_err)?;
    Ok((rows, total))
}

pub struct AdminNewUser {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
}

/// Admin-created accounts skip e-mail confirmation; role extension rows
/// are created alongside the user.
pub async fn create_user_by_admin(
    db: &DatabaseConnection,
    input: AdminNewUser,
) -> Result<user::Model, ServiceError> {
    if !validation::valid_full_name(&input.full_name) {
        return Err(ServiceError::Validation("full name is required".into()));
    }
    if !validation::valid_email(&input.email) {
        return Err(ServiceError::Validation("invalid e-mail address".into()));
    }
    if !validation::valid_password(&input.password) {
        return Err(ServiceError::Validation("password too short (>=8)".into()));
    }
    let email = validation::normalize_email(&input.email);
    if user::find_by_email(db, &email).await?.is_some() {
        return Err(ServiceError::Conflict("e-mail is already in use".into()));
    }
    let password_hash = crate::auth::service::hash_password(&input.password)
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let now = Utc::now().into();
    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name: Set(input.full_name.trim().to_string()),
        email: Set(email),
        phone: Set(input.phone),
        password_hash: Set(password_hash),
        role: Set(input.role),
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
    .await
    .map_err(db_err)?;

    match input.role {
        Role::Technician => {
            technician::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(created.id),
                experience_years: Set(0),
                rating_average: Set(Decimal::ZERO),
                total_ratings: Set(0),
                availability: Set(Availability::Available),
                wallet_balance: Set(Decimal::ZERO),
                total_jobs_completed: Set(0),
                verification_status: Set(VerificationStatus::Pending),
                verified_at: Set(None),
                id_proof: Set(None),
                certificate: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await
            .map_err(db_err)?;
        }
        Role::Admin => {
            admin::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(created.id),
                admin_level: Set(AdminLevel::Moderator),
                can_manage_users: Set(true),
                can_manage_services: Set(true),
                can_view_reports: Set(true),
                last_login_at: Set(None),
                last_login_ip: Set(None),
                created_at: Set(now),
            }
            .insert(db)
            .await
            .map_err(db_err)?;
        }
        Role::Customer => {}
    }
    info!(user = %created.id, role = ?created.role, "user_created_by_admin");
    Ok(created)
}

/// Admin edit of another account. A new e-mail must be free; a role
/// change creates the missing extension row for the new role.
#[allow(clippy::too_many_arguments)]
pub async fn update_user_by_admin(
    db: &DatabaseConnection,
    user_id: Uuid,
    full_name: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
    role: Option<Role>,
    status: Option<AccountStatus>,
) -> Result<user::Model, ServiceError> {
    let existing = get_profile(db, user_id).await?;
    let mut am: user::ActiveModel = existing.into();
    if let Some(name) = full_name {
        if !validation::valid_full_name(name) {
            return Err(ServiceError::Validation("full name is required".into()));
        }
        am.full_name = Set(name.trim().to_string());
    }
    if let Some(p) = phone {
        am.phone = Set(Some(p.trim().to_string()));
    }
    if let Some(e) = email {
        if !validation::valid_email(e) {
            return Err(ServiceError::Validation("invalid e-mail address".into()));
        }
        let normalized = validation::normalize_email(e);
        if let Some(taken) = user::find_by_email(db, &normalized).await? {
            if taken.id != user_id {
                return Err(ServiceError::Conflict("e-mail is already in use".into()));
            }
        }
        am.email = Set(normalized);
    }
    if let Some(r) = role {
        am.role = Set(r);
    }
    if let Some(s) = status {
        am.status = Set(s);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(db_err)?;
    if let Some(r) = role {
        ensure_extension_row(db, updated.id, r).await?;
    }
    info!(user = %user_id, "user_updated_by_admin");
    Ok(updated)
}

/// A role change must leave the matching extension row behind; existing
/// rows for former roles are kept and removed only with the user.
async fn ensure_extension_row(
    db: &DatabaseConnection,
    user_id: Uuid,
    role: Role,
) -> Result<(), ServiceError> {
    let now = Utc::now().into();
    match role {
        Role::Technician => {
            if technician::find_by_user(db, user_id).await?.is_none() {
                technician::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    experience_years: Set(0),
                    rating_average: Set(Decimal::ZERO),
                    total_ratings: Set(0),
                    availability: Set(Availability::Available),
                    wallet_balance: Set(Decimal::ZERO),
                    total_jobs_completed: Set(0),
                    verification_status: Set(VerificationStatus::Pending),
                    verified_at: Set(None),
                    id_proof: Set(None),
                    certificate: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await
                .map_err(db_err)?;
            }
        }
        Role::Admin => {
            if admin::find_by_user(db, user_id).await?.is_none() {
                admin::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    admin_level: Set(AdminLevel::Moderator),
                    can_manage_users: Set(true),
                    can_manage_services: Set(true),
                    can_view_reports: Set(true),
                    last_login_at: Set(None),
                    last_login_ip: Set(None),
                    created_at: Set(now),
                }
                .insert(db)
                .await
                .map_err(db_err)?;
            }
        }
        Role::Customer => {}
    }
    Ok(())
}

/// Hard delete; extension rows and addresses go with the user, bookings
/// cascade from the customer side.
pub async fn delete_user(db: &DatabaseConnection, user_id: Uuid) -> Result<(), ServiceError> {
    let res = user::Entity::delete_by_id(user_id).exec(db).await.map_err(db_err)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("user"));
    }
    info!(user = %user_id, "user_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn first_address_becomes_default() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let u = create_user_by_admin(
            &db,
            AdminNewUser {
                full_name: "Address Owner".into(),
                email: format!("accounts_addr_{}@example.com", Uuid::new_v4()),
                phone: None,
                password: "Sup3rSecret".into(),
                role: Role::Customer,
            },
        )
        .await?;

        let first = add_address(
            &db,
            u.id,
            address::NewAddress {
                street: "1 First Lane".into(),
                city: "Colombo".into(),
                state: "Western".into(),
                postal_code: "00100".into(),
                country: None,
            },
        )
        .await?;
        let second = add_address(
            &db,
            u.id,
            address::NewAddress {
                street: "2 Second Lane".into(),
                city: "Colombo".into(),
                state: "Western".into(),
                postal_code: "00100".into(),
                country: Some("".into()),
            },
        )
        .await?;
        assert!(first.is_default);
        assert!(!second.is_default);
        assert_eq!(second.country, "Sri Lanka");
        assert_eq!(list_addresses(&db, u.id).await?.len(), 2);

        delete_user(&db, u.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn admin_user_management_roundtrip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let email = format!("accounts_mgmt_{}@example.com", Uuid::new_v4());
        let tech = create_user_by_admin(
            &db,
            AdminNewUser {
                full_name: "Managed Technician".into(),
                email: email.clone(),
                phone: Some("0779999999".into()),
                password: "Sup3rSecret".into(),
                role: Role::Technician,
            },
        )
        .await?;
        assert!(tech.email_confirmed);
        // the extension row exists with a pending application
        let t = technician::find_by_user(&db, tech.id).await?.expect("technician row");
        assert_eq!(t.verification_status, VerificationStatus::Pending);

        // duplicate e-mail is refused before touching the database index
        let dup = create_user_by_admin(
            &db,
            AdminNewUser {
                full_name: "Clone".into(),
                email: email.to_uppercase(),
                phone: None,
                password: "Sup3rSecret".into(),
                role: Role::Customer,
            },
        )
        .await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        // filtered listing with a name fragment finds it
        let (rows, total) = list_users(
            &db,
            Some(Role::Technician),
            None,
            Some("managed tech"),
            Pagination::default(),
        )
        .await?;
        assert!(total >= 1);
        assert!(rows.iter().any(|u| u.id == tech.id));

        let banned = update_user_by_admin(
            &db,
            tech.id,
            None,
            None,
            None,
            None,
            Some(AccountStatus::Banned),
        )
        .await?;
        assert_eq!(banned.status, AccountStatus::Banned);

        delete_user(&db, tech.id).await?;
        let gone = get_profile(&db, tech.id).await;
        assert!(matches!(gone, Err(ServiceError::NotFound(_))));
        // cascade removed the technician row too
        assert!(technician::find_by_user(&db, tech.id).await?.is_none());
        Ok(())
    }
}
