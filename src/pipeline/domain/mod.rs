//! Domain model for the request, plan, task and orchestration pipeline.
//!
//! The domain owns identifiers, lifecycle state machines, the assignment
//! policies and the status-report rules. Storage, generators and transport
//! stay outside of this boundary.

mod agent;
mod assignment;
mod branch;
mod error;
mod filter;
mod identity;
mod ids;
mod orchestration;
mod plan;
mod pull_request;
mod report;
mod request;
mod sandbox;
mod task;
mod ticket;

pub use agent::{AgentName, AgentRoster, AgentSelection, MAX_NUMBERED_AGENTS};
pub use assignment::{Assignment, backlog_admissions, busy_agents, round_robin};
pub use branch::{BranchName, DEFAULT_TARGET_BRANCH};
pub use error::{
    ConflictError, ParseOrchestrationStateError, ParseRequestStateError, ParseTaskStateError,
    PipelineDomainError, ValidationError,
};
pub use filter::TaskFilter;
pub use identity::IdentityAllocator;
pub use ids::{EntityKind, EntityRef, OrchestrationId, PlanId, RequestId, TaskId};
pub use orchestration::{Orchestration, OrchestrationSnapshot, OrchestrationState};
pub use plan::{PlanBlueprint, Plan, STUB_TASKS, TaskDefinition, stub_design_doc};
pub use pull_request::PullRequestUrl;
pub use report::{ReportOutcome, StatusReport};
pub use request::{Request, RequestDetails, RequestState};
pub use sandbox::{PathTraversalError, SandboxPath};
pub use task::{Task, TaskState};
pub use ticket::{TicketDecodeError, decode_tickets};
