//! Port for the external service that drafts designs and tickets.

use crate::pipeline::domain::{RequestDetails, TicketDecodeError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for plan generator operations.
pub type PlanGeneratorResult<T> = Result<T, ExternalServiceError>;

/// Generative planning service contract.
///
/// Both outputs are opaque text; the pipeline validates tickets with
/// [`decode_tickets`](crate::pipeline::domain::decode_tickets) before storing
/// anything.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Drafts a design document for a request that has not been stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`ExternalServiceError`] when the service cannot produce a
    /// design.
    async fn design(&self, request: &RequestDetails) -> PlanGeneratorResult<String>;

    /// Breaks `design_doc` into a raw ticket list.
    ///
    /// # Errors
    ///
    /// Returns [`ExternalServiceError`] when the service cannot produce
    /// tickets.
    async fn tickets(&self, design_doc: &str) -> PlanGeneratorResult<String>;
}

/// Failures of the external planning service.
#[derive(Debug, Clone, Error)]
pub enum ExternalServiceError {
    /// No generator is configured for this deployment.
    #[error("plan generator is not configured")]
    NotConfigured,

    /// A generator call did not finish in time.
    #[error("plan generator did not respond within {0:?}")]
    Timeout(Duration),

    /// The generator returned an empty design document.
    #[error("plan generator returned an empty design document")]
    EmptyDesign,

    /// The generator's ticket list could not be decoded.
    #[error("plan generator returned unusable tickets: {0}")]
    UnparsableTickets(#[from] TicketDecodeError),

    /// The generator failed.
    #[error("plan generator unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExternalServiceError {
    /// Wraps a generator transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
