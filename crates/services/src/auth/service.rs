use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
use rand::rngs::OsRng;
use sea_orm::ActiveEnum;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::enums::Role;
use models::validation;

use super::domain::{
    AuthSession, AuthUser, BootstrapAdminInput, Claims, LoginInput, NewAccount, RegisterInput,
    RegisteredAccount,
};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

const VERIFICATION_TOKEN_HOURS: i64 = 24;
const RESET_TOKEN_HOURS: i64 = 1;

/// Hash a password with argon2 and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

fn verify_password(hash: &str, password: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn one_time_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn expired(expires: Option<DateTime<FixedOffset>>, now: DateTime<FixedOffset>) -> bool {
    expires.map_or(true, |e| e < now)
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a customer or technician account.
    ///
    /// The e-mail is stored lowercased; technicians get a pending
    /// verification profile in the same call. The returned verification
    /// token must be redeemed before login succeeds.
    ///
    /// # Examples
    /// ```
    /// use services::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use services::auth::domain::RegisterInput;
    /// use models::enums::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 12 });
    /// let input = RegisterInput { full_name: "Test".into(), email: "User@Example.com".into(), phone: None, password: "Secret123".into(), role: Role::Customer };
    /// let account = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(account.user.email, "user@example.com");
    /// assert!(!account.verification_token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<RegisteredAccount, AuthError> {
        if matches!(input.role, Role::Admin) {
            return Err(AuthError::Validation("admin accounts are provisioned separately".into()));
        }
        if !validation::valid_full_name(&input.full_name) {
            return Err(AuthError::Validation("full name is required".into()));
        }
        if !validation::valid_email(&input.email) {
            return Err(AuthError::Validation("invalid e-mail address".into()));
        }
        if !validation::valid_password(&input.password) {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }

        let email = validation::normalize_email(&input.email);
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("account exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(&input.password)?;
        let token = one_time_token();
        let token_expires: DateTime<FixedOffset> =
            (Utc::now() + Duration::hours(VERIFICATION_TOKEN_HOURS)).into();

        let user = self
            .repo
            .create_account(NewAccount {
                full_name: input.full_name.trim().to_string(),
                email,
                phone: input.phone,
                password_hash,
                role: input.role,
                email_confirmed: false,
                verification_token: Some(token.clone()),
                token_expires: Some(token_expires),
            })
            .await?;
        info!(user_id = %user.id, email = %user.email, role = ?user.role, "account_registered");
        Ok(RegisteredAccount { user, verification_token: token, token_expires })
    }

    /// Authenticate and issue a bearer token.
    ///
    /// Requires a confirmed e-mail and an Active account. Technician
    /// sessions carry the current verification status; admin logins are
    /// stamped with time and source address.
    ///
    /// # Examples
    /// ```
    /// use services::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use services::auth::domain::{RegisterInput, LoginInput};
    /// use models::enums::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 12 });
    /// let reg = tokio_test::block_on(svc.register(RegisterInput { full_name: "N".into(), email: "u@e.com".into(), phone: None, password: "Passw0rd".into(), role: Role::Customer })).unwrap();
    /// tokio_test::block_on(svc.confirm_email(&reg.verification_token)).unwrap();
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into(), client_ip: None })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = validation::normalize_email(&input.email);
        let user = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self
            .repo
            .credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !verify_password(&cred.password_hash, &input.password)? {
            return Err(AuthError::Unauthorized);
        }

        if !user.email_confirmed {
            return Err(AuthError::EmailNotVerified);
        }
        if user.status != models::enums::AccountStatus::Active {
            return Err(AuthError::AccountDisabled(user.status.to_value()));
        }

        let token = self.issue_token(&user)?;

        let verification_status = match user.role {
            Role::Technician => self.repo.technician_verification(user.id).await?,
            _ => None,
        };
        if matches!(user.role, Role::Admin) {
            self.repo
                .record_admin_login(user.id, Utc::now().into(), input.client_ip.clone())
                .await?;
        }

        info!(user_id = %user.id, role = ?user.role, "login_ok");
        Ok(AuthSession { user, token, verification_status })
    }

    /// Redeem an e-mail verification token.
    #[instrument(skip(self, token))]
    pub async fn confirm_email(&self, token: &str) -> Result<(), AuthError> {
        let state = self
            .repo
            .find_by_verification_token(token)
            .await?
            .ok_or_else(|| AuthError::NotFound("verification token".into()))?;
        if expired(state.expires, Utc::now().into()) {
            return Err(AuthError::Validation("verification token expired".into()));
        }
        self.repo.mark_email_confirmed(state.user_id).await?;
        info!(user_id = %state.user_id, "email_confirmed");
        Ok(())
    }

    /// Issue a fresh verification token for an unconfirmed account.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn resend_verification(&self, email: &str) -> Result<RegisteredAccount, AuthError> {
        let email = validation::normalize_email(email);
        let user = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::NotFound("user".into()))?;
        if user.email_confirmed {
            return Err(AuthError::Validation("e-mail is already verified".into()));
        }
        let token = one_time_token();
        let token_expires: DateTime<FixedOffset> =
            (Utc::now() + Duration::hours(VERIFICATION_TOKEN_HOURS)).into();
        self.repo.store_verification_token(user.id, &token, token_expires).await?;
        Ok(RegisteredAccount { user, verification_token: token, token_expires })
    }

    /// Start a password reset; the token expires after one hour.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthError> {
        let email = validation::normalize_email(email);
        let user = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::NotFound("user".into()))?;
        let token = one_time_token();
        let expires: DateTime<FixedOffset> = (Utc::now() + Duration::hours(RESET_TOKEN_HOURS)).into();
        self.repo.store_reset_token(user.id, &token, expires).await?;
        info!(user_id = %user.id, "reset_token_issued");
        Ok(token)
    }

    /// Redeem a reset token and set a new password.
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        if !validation::valid_password(new_password) {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        let state = self
            .repo
            .find_by_reset_token(token)
            .await?
            .ok_or_else(|| AuthError::NotFound("reset token".into()))?;
        if expired(state.expires, Utc::now().into()) {
            return Err(AuthError::Validation("reset token expired".into()));
        }
        let hash = hash_password(new_password)?;
        self.repo.set_password(state.user_id, hash).await?;
        info!(user_id = %state.user_id, "password_reset");
        Ok(())
    }

    /// Create the very first admin; conflicts once any admin exists.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn bootstrap_admin(&self, input: BootstrapAdminInput) -> Result<AuthUser, AuthError> {
        if !validation::valid_full_name(&input.full_name) {
            return Err(AuthError::Validation("full name is required".into()));
        }
        if !validation::valid_email(&input.email) {
            return Err(AuthError::Validation("invalid e-mail address".into()));
        }
        if !validation::valid_password(&input.password) {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if self.repo.admin_exists().await? {
            return Err(AuthError::Conflict);
        }
        let password_hash = hash_password(&input.password)?;
        let user = self
            .repo
            .create_admin_account(NewAccount {
                full_name: input.full_name.trim().to_string(),
                email: validation::normalize_email(&input.email),
                phone: None,
                password_hash,
                role: Role::Admin,
                email_confirmed: true,
                verification_token: None,
                token_expires: None,
            })
            .await?;
        info!(user_id = %user.id, "admin_bootstrapped");
        Ok(user)
    }

    fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id,
            role: user.role,
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize,
        };
        encode(
            &JwtHeader::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}
