//! SeaORM-backed implementation of [`AuthRepository`].

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use models::enums::{AccountStatus, AdminLevel, Availability, Role, VerificationStatus};
use models::{admin, technician, user};

use crate::auth::domain::{AuthUser, Credentials, NewAccount, TokenState};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn db_err(e: impl std::fmt::Display) -> AuthError {
    let msg = e.to_string();
    // Postgres reports unique-index violations as "duplicate key"
    if msg.contains("duplicate key") {
        AuthError::Conflict
    } else {
        AuthError::Repository(msg)
    }
}

fn to_auth_user(u: user::Model) -> AuthUser {
    AuthUser {
        id: u.id,
        full_name: u.full_name,
        email: u.email,
        phone: u.phone,
        role: u.role,
        status: u.status,
        email_confirmed: u.email_confirmed,
        profile_image: u.profile_image,
    }
}

fn new_user_row(rec: &NewAccount, now: DateTime<FixedOffset>) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name: Set(rec.full_name.clone()),
        email: Set(rec.email.clone()),
        phone: Set(rec.phone.clone()),
        password_hash: Set(rec.password_hash.clone()),
        role: Set(rec.role),
        status: Set(AccountStatus::Active),
        email_confirmed: Set(rec.email_confirmed),
        verification_token: Set(rec.verification_token.clone()),
        token_expires: Set(rec.token_expires),
        reset_token: Set(None),
        reset_token_expires: Set(None),
        profile_image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

impl SeaOrmAuthRepository {
    async fn load_user(&self, user_id: Uuid) -> Result<user::Model, AuthError> {
        user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AuthError::NotFound("user".into()))
    }
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let found = user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(to_auth_user))
    }

    async fn credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let found = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(|u| Credentials { user_id: u.id, password_hash: u.password_hash }))
    }

    async fn create_account(&self, rec: NewAccount) -> Result<AuthUser, AuthError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let user = new_user_row(&rec, now).insert(&self.db).await.map_err(db_err)?;

        // Technicians get their verification profile in the same call.
        if matches!(rec.role, Role::Technician) {
            technician::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
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
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        }
        Ok(to_auth_user(user))
    }

    async fn create_admin_account(&self, rec: NewAccount) -> Result<AuthUser, AuthError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let user = new_user_row(&rec, now).insert(&self.db).await.map_err(db_err)?;
        admin::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            admin_level: Set(AdminLevel::SuperAdmin),
            can_manage_users: Set(true),
            can_manage_services: Set(true),
            can_view_reports: Set(true),
            last_login_at: Set(None),
            last_login_ip: Set(None),
            created_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Ok(to_auth_user(user))
    }

    async fn admin_exists(&self) -> Result<bool, AuthError> {
        admin::any_exists(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<TokenState>, AuthError> {
        let found = user::Entity::find()
            .filter(user::Column::VerificationToken.eq(token))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(|u| TokenState { user_id: u.id, expires: u.token_expires }))
    }

    async fn mark_email_confirmed(&self, user_id: Uuid) -> Result<(), AuthError> {
        let mut row: user::ActiveModel = self.load_user(user_id).await?.into();
        row.email_confirmed = Set(true);
        row.verification_token = Set(None);
        row.token_expires = Set(None);
        row.updated_at = Set(Utc::now().into());
        row.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn store_verification_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires: DateTime<FixedOffset>,
    ) -> Result<(), AuthError> {
        let mut row: user::ActiveModel = self.load_user(user_id).await?.into();
        row.verification_token = Set(Some(token.to_string()));
        row.token_expires = Set(Some(expires));
        row.updated_at = Set(Utc::now().into());
        row.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<TokenState>, AuthError> {
        let found = user::Entity::find()
            .filter(user::Column::ResetToken.eq(token))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(|u| TokenState { user_id: u.id, expires: u.reset_token_expires }))
    }

    async fn store_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires: DateTime<FixedOffset>,
    ) -> Result<(), AuthError> {
        let mut row: user::ActiveModel = self.load_user(user_id).await?.into();
        row.reset_token = Set(Some(token.to_string()));
        row.reset_token_expires = Set(Some(expires));
        row.updated_at = Set(Utc::now().into());
        row.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn set_password(&self, user_id: Uuid, password_hash: String) -> Result<(), AuthError> {
        let mut row: user::ActiveModel = self.load_user(user_id).await?.into();
        row.password_hash = Set(password_hash);
        row.reset_token = Set(None);
        row.reset_token_expires = Set(None);
        row.updated_at = Set(Utc::now().into());
        row.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn technician_verification(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationStatus>, AuthError> {
        let found = technician::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(|t| t.verification_status))
    }

    async fn record_admin_login(
        &self,
        user_id: Uuid,
        at: DateTime<FixedOffset>,
        ip: Option<String>,
    ) -> Result<(), AuthError> {
        let found = admin::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        let Some(row) = found else {
            return Err(AuthError::NotFound("admin profile".into()));
        };
        let mut row: admin::ActiveModel = row.into();
        row.last_login_at = Set(Some(at));
        row.last_login_ip = Set(ip);
        row.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn account(email: &str, role: Role) -> NewAccount {
        NewAccount {
            full_name: "Repo Test".into(),
            email: email.into(),
            phone: None,
            password_hash: "$argon2id$fake".into(),
            role,
            email_confirmed: false,
            verification_token: Some(format!("tok-{email}")),
            token_expires: Some((Utc::now() + chrono::Duration::hours(1)).into()),
        }
    }

    #[tokio::test]
    async fn technician_account_gets_pending_profile() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let repo = SeaOrmAuthRepository::new(get_db().await?);
        let email = format!("repo_tech_{}@example.com", Uuid::new_v4());

        let created = repo
            .create_account(account(&email, Role::Technician))
            .await?;
        assert_eq!(created.role, Role::Technician);

        let status = repo.technician_verification(created.id).await?;
        assert_eq!(status, Some(VerificationStatus::Pending));

        // token lookup and confirmation round trip
        let state = repo
            .find_by_verification_token(&format!("tok-{email}"))
            .await?
            .ok_or_else(|| anyhow::anyhow!("token not stored"))?;
        assert_eq!(state.user_id, created.id);
        repo.mark_email_confirmed(created.id).await?;
        assert!(repo
            .find_by_verification_token(&format!("tok-{email}"))
            .await?
            .is_none());

        // duplicate e-mail trips the unique index
        let dup = repo.create_account(account(&email, Role::Customer)).await;
        assert!(matches!(dup, Err(AuthError::Conflict)));

        user::Entity::delete_by_id(created.id).exec(&repo.db).await.ok();
        Ok(())
    }
}
