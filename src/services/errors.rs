use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::repositories::RepositoryError;

/// Errors surfaced by the team service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A mandatory field was missing or blank
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Team not found with id {0}")]
    TeamNotFound(i64),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
