use divelog_db::error::DbError;
use thiserror::Error;

use crate::dive::validation::ValidationErrors;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid dive data: {0}")]
    ValidationError(ValidationErrors),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Resolver unavailable: {0}")]
    ResolverUnavailable(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error(transparent)]
    CoreError(#[from] divelog_core::error::CoreError),
}

impl From<DbError> for ServiceError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::NotFound(what) => Self::NotFound(what),
            DbError::DuplicateKey { .. } => Self::Conflict(error.to_string()),
            DbError::CoreError(core) => Self::CoreError(core),
            other => {
                tracing::error!(error = %other, "Dive store failure");
                Self::StoreUnavailable(other.to_string())
            }
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationError(errors)
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
