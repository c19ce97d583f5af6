use thiserror::Error;

use crate::media::MediaError;
use crate::repository::errors::RepositoryError;
use crate::services::images::FailedUpload;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by the service layer, one variant per caller-visible outcome.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller did not present a valid token.
    #[error("authentication required")]
    Unauthorized,
    /// The caller is authenticated but the role or branch does not allow the action.
    #[error("{0}")]
    Forbidden(String),
    /// The request payload failed validation.
    #[error("{0}")]
    Form(String),
    #[error("{0}")]
    NotFound(String),
    /// A uniqueness rule was broken (duplicate barcode, category, branch...).
    #[error("{0}")]
    Conflict(String),
    /// A deletion was refused because products still reference the target.
    #[error("{message}")]
    InUse { message: String, count: usize },
    #[error("{0}")]
    RateLimited(String),
    /// Every file of an upload call was rejected or failed.
    #[error("no image could be uploaded")]
    NothingUploaded(Vec<FailedUpload>),
    #[error("media store failure: {0}")]
    Media(#[from] MediaError),
    #[error("repository failure: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound("Resource not found".to_string()),
            RepositoryError::UniqueViolation(detail) => {
                log::warn!("Unique constraint rejected a write: {detail}");
                ServiceError::Conflict("A record with the same unique value already exists".into())
            }
            other => ServiceError::Repository(other),
        }
    }
}

impl ServiceError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn form(message: impl Into<String>) -> Self {
        ServiceError::Form(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    /// Whether the error originates outside the request (database, media store).
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, ServiceError::Media(_) | ServiceError::Repository(_))
    }
}
