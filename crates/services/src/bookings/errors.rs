use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("repository error: {0}")]
    Repository(String),
}
