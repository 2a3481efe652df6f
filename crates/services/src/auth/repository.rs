use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, NewAccount, TokenState};
use super::errors::AuthError;
use models::enums::VerificationStatus;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;

    /// Insert the user row; technicians also get their pending extension row.
    async fn create_account(&self, rec: NewAccount) -> Result<AuthUser, AuthError>;
    /// Insert user + admin rows in one go (bootstrap and admin-created admins).
    async fn create_admin_account(&self, rec: NewAccount) -> Result<AuthUser, AuthError>;
    async fn admin_exists(&self) -> Result<bool, AuthError>;

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<TokenState>, AuthError>;
    /// Confirm the e-mail and clear the verification token.
    async fn mark_email_confirmed(&self, user_id: Uuid) -> Result<(), AuthError>;
    async fn store_verification_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires: DateTime<FixedOffset>,
    ) -> Result<(), AuthError>;

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<TokenState>, AuthError>;
    async fn store_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires: DateTime<FixedOffset>,
    ) -> Result<(), AuthError>;
    /// Replace the password hash and clear any reset token.
    async fn set_password(&self, user_id: Uuid, password_hash: String) -> Result<(), AuthError>;

    /// Verification state of the user's technician profile, if any.
    async fn technician_verification(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationStatus>, AuthError>;
    async fn record_admin_login(
        &self,
        user_id: Uuid,
        at: DateTime<FixedOffset>,
        ip: Option<String>,
    ) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use models::enums::Role;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone)]
    struct MockAccount {
        user: AuthUser,
        password_hash: String,
        verification_token: Option<String>,
        token_expires: Option<DateTime<FixedOffset>>,
        reset_token: Option<String>,
        reset_token_expires: Option<DateTime<FixedOffset>>,
        verification: Option<VerificationStatus>,
        is_admin: bool,
        last_admin_login: Option<(DateTime<FixedOffset>, Option<String>)>,
    }

    #[derive(Default)]
    pub struct MockAuthRepository {
        accounts: Mutex<HashMap<Uuid, MockAccount>>, // key: user_id
    }

    impl MockAuthRepository {
        fn insert_record(&self, rec: NewAccount, is_admin: bool) -> Result<AuthUser, AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.values().any(|a| a.user.email == rec.email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                full_name: rec.full_name,
                email: rec.email,
                phone: rec.phone,
                role: rec.role,
                status: models::enums::AccountStatus::Active,
                email_confirmed: rec.email_confirmed,
                profile_image: None,
            };
            let verification = match rec.role {
                Role::Technician => Some(VerificationStatus::Pending),
                _ => None,
            };
            accounts.insert(
                user.id,
                MockAccount {
                    user: user.clone(),
                    password_hash: rec.password_hash,
                    verification_token: rec.verification_token,
                    token_expires: rec.token_expires,
                    reset_token: None,
                    reset_token_expires: None,
                    verification,
                    is_admin,
                    last_admin_login: None,
                },
            );
            Ok(user)
        }

        /// Test hook: whether a login was recorded on the admin profile.
        pub fn admin_login_recorded(&self, user_id: Uuid) -> bool {
            let accounts = self.accounts.lock().unwrap();
            accounts
                .get(&user_id)
                .map(|a| a.last_admin_login.is_some())
                .unwrap_or(false)
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.values().find(|a| a.user.email == email).map(|a| a.user.clone()))
        }

        async fn credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.get(&user_id).map(|a| Credentials {
                user_id,
                password_hash: a.password_hash.clone(),
            }))
        }

        async fn create_account(&self, rec: NewAccount) -> Result<AuthUser, AuthError> {
            self.insert_record(rec, false)
        }

        async fn create_admin_account(&self, rec: NewAccount) -> Result<AuthUser, AuthError> {
            self.insert_record(rec, true)
        }

        async fn admin_exists(&self) -> Result<bool, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.values().any(|a| a.is_admin))
        }

        async fn find_by_verification_token(
            &self,
            token: &str,
        ) -> Result<Option<TokenState>, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts
                .values()
                .find(|a| a.verification_token.as_deref() == Some(token))
                .map(|a| TokenState { user_id: a.user.id, expires: a.token_expires }))
        }

        async fn mark_email_confirmed(&self, user_id: Uuid) -> Result<(), AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            let acc = accounts
                .get_mut(&user_id)
                .ok_or_else(|| AuthError::NotFound("user".into()))?;
            acc.user.email_confirmed = true;
            acc.verification_token = None;
            acc.token_expires = None;
            Ok(())
        }

        async fn store_verification_token(
            &self,
            user_id: Uuid,
            token: &str,
            expires: DateTime<FixedOffset>,
        ) -> Result<(), AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            let acc = accounts
                .get_mut(&user_id)
                .ok_or_else(|| AuthError::NotFound("user".into()))?;
            acc.verification_token = Some(token.to_string());
            acc.token_expires = Some(expires);
            Ok(())
        }

        async fn find_by_reset_token(&self, token: &str) -> Result<Option<TokenState>, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts
                .values()
                .find(|a| a.reset_token.as_deref() == Some(token))
                .map(|a| TokenState { user_id: a.user.id, expires: a.reset_token_expires }))
        }

        async fn store_reset_token(
            &self,
            user_id: Uuid,
            token: &str,
            expires: DateTime<FixedOffset>,
        ) -> Result<(), AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            let acc = accounts
                .get_mut(&user_id)
                .ok_or_else(|| AuthError::NotFound("user".into()))?;
            acc.reset_token = Some(token.to_string());
            acc.reset_token_expires = Some(expires);
            Ok(())
        }

        async fn set_password(&self, user_id: Uuid, password_hash: String) -> Result<(), AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            let acc = accounts
                .get_mut(&user_id)
                .ok_or_else(|| AuthError::NotFound("user".into()))?;
            acc.password_hash = password_hash;
            acc.reset_token = None;
            acc.reset_token_expires = None;
            Ok(())
        }

        async fn technician_verification(
            &self,
            user_id: Uuid,
        ) -> Result<Option<VerificationStatus>, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.get(&user_id).and_then(|a| a.verification))
        }

        async fn record_admin_login(
            &self,
            user_id: Uuid,
            at: DateTime<FixedOffset>,
            ip: Option<String>,
        ) -> Result<(), AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            if let Some(acc) = accounts.get_mut(&user_id) {
                acc.last_admin_login = Some((at, ip));
            }
            Ok(())
        }
    }
}
