//! Application services for the pipeline.

mod assignment;
mod error;
mod pipeline;
mod query;
mod status;
mod workflow;

pub use assignment::OrchestratePlanRequest;
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use pipeline::{NewRequest, PipelineService};
pub use status::ReportStatusRequest;
pub use workflow::{DEFAULT_GENERATOR_TIMEOUT, PlanningWorkflow, WorkflowOutcome};
