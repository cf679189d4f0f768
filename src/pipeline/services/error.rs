//! Service-level errors for pipeline operations.

use crate::pipeline::{
    domain::{
        ConflictError, EntityRef, ParseTaskStateError, PathTraversalError, PipelineDomainError,
        ValidationError,
    },
    ports::{ExternalServiceError, PipelineStoreError},
};
use thiserror::Error;

/// Failure categories callers map to transport-level responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// Input was malformed or violated a value rule.
    Validation,
    /// The operation conflicts with the current lifecycle state.
    Conflict,
    /// An agent path escapes its sandbox.
    PathTraversal,
    /// The external planning service failed.
    ExternalService,
    /// The external planning service is not configured.
    Unavailable,
    /// Storage failed.
    Internal,
}

/// Errors returned by pipeline services.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(EntityRef),
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A lifecycle rule was violated.
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    /// An agent-supplied path escapes its sandbox.
    #[error(transparent)]
    PathTraversal(#[from] PathTraversalError),
    /// The external planning service failed.
    #[error(transparent)]
    ExternalService(#[from] ExternalServiceError),
    /// The store failed.
    #[error(transparent)]
    Store(PipelineStoreError),
}

impl PipelineError {
    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::PathTraversal(_) => ErrorKind::PathTraversal,
            Self::ExternalService(ExternalServiceError::NotConfigured) => ErrorKind::Unavailable,
            Self::ExternalService(_) => ErrorKind::ExternalService,
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<PipelineStoreError> for PipelineError {
    fn from(err: PipelineStoreError) -> Self {
        match err {
            PipelineStoreError::NotFound(entity) => Self::NotFound(entity),
            other @ PipelineStoreError::Persistence(_) => Self::Store(other),
        }
    }
}

impl From<PipelineDomainError> for PipelineError {
    fn from(err: PipelineDomainError) -> Self {
        match err {
            PipelineDomainError::Validation(inner) => Self::Validation(inner),
            PipelineDomainError::Conflict(inner) => Self::Conflict(inner),
            PipelineDomainError::PathTraversal(inner) => Self::PathTraversal(inner),
        }
    }
}

impl From<ParseTaskStateError> for PipelineError {
    fn from(err: ParseTaskStateError) -> Self {
        Self::Validation(err.into())
    }
}

/// Result type for pipeline service operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
