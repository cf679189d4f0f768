//! Port contracts for the pipeline.
//!
//! Ports define infrastructure-agnostic interfaces used by pipeline services.

pub mod planner;
pub mod store;

#[cfg(test)]
pub use planner::MockPlanGenerator;
pub use planner::{ExternalServiceError, PlanGenerator, PlanGeneratorResult};
pub use store::{PipelineStore, PipelineStoreError, PipelineStoreResult, StoreChanges};
