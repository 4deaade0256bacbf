use divelog_service::dive::{FieldError, SubmissionError};
use divelog_service::error::ServiceError;
use salvo::{Depot, Request, Response, Writer, async_trait, http::StatusCode, writing::Json};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    CoreError(#[from] divelog_core::error::CoreError),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl From<SubmissionError> for AppError {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Malformed(message) => Self::InvalidJson(message),
            SubmissionError::Invalid(errors) => {
                Self::ServiceError(ServiceError::ValidationError(errors))
            }
        }
    }
}

/// ## Summary
/// Error response payload. `fields` lists every rejected field of an invalid
/// dive submission.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(service) => match service {
                ServiceError::ValidationError(_)
                | ServiceError::InvalidQuery(_)
                | ServiceError::UploadRejected(_) => StatusCode::BAD_REQUEST,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::ResolverUnavailable(_) | ServiceError::StoreUnavailable(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ServiceError::InvalidConfiguration(_)
                | ServiceError::InvariantViolation(_)
                | ServiceError::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidJson(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::CoreError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal failures are reported without their details; upstream
    /// outages keep theirs.
    fn hides_details(&self) -> bool {
        let status = self.status_code();
        status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE
    }

    fn to_response(&self) -> ErrorResponse {
        match self {
            Self::ServiceError(ServiceError::ValidationError(errors)) => ErrorResponse {
                error: format!("Invalid dive data: {errors}"),
                fields: Some(errors.iter().cloned().collect()),
            },
            Self::ServiceError(
                ServiceError::InvalidQuery(message)
                | ServiceError::NotFound(message)
                | ServiceError::UploadRejected(message),
            ) => ErrorResponse {
                error: message.clone(),
                fields: None,
            },
            other if other.hides_details() => ErrorResponse {
                error: "Internal server error".to_string(),
                fields: None,
            },
            other => ErrorResponse {
                error: other.to_string(),
                fields: None,
            },
        }
    }

    /// ## Summary
    /// Writes the status code and JSON error body for this error.
    pub fn render(&self, res: &mut Response) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        res.status_code(status);
        res.render(Json(self.to_response()));
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        self.render(res);
    }
}
