use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("account already exists")]
    Conflict,
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("e-mail address not verified")]
    EmailNotVerified,
    #[error("account is {0}")]
    AccountDisabled(String),
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::NotFound(_) => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::EmailNotVerified => 1005,
            AuthError::AccountDisabled(_) => 1006,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}
