//! Error types for pipeline domain validation and state transitions.

use super::{
    AgentName, OrchestrationId, OrchestrationState, PathTraversalError, PlanId, PullRequestUrl,
    RequestId, RequestState, TaskId, TaskState,
};
use thiserror::Error;

/// Errors returned while constructing or validating domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The request title is empty after trimming.
    #[error("request title must not be empty")]
    EmptyRequestTitle,

    /// A task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The agent name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyAgentName,

    /// The agent name contains characters outside `[A-Za-z0-9_.-]`.
    #[error(
        "agent name '{0}' contains invalid characters (only ASCII letters, digits, '.', '-' and '_' allowed)"
    )]
    InvalidAgentName(String),

    /// The agent name exceeds the 100-character limit.
    #[error("agent name exceeds 100 character limit: {0}")]
    AgentNameTooLong(String),

    /// An agent roster was requested with no agents.
    #[error("agent roster must contain at least one agent")]
    EmptyAgentRoster,

    /// A generated roster would exceed the supported size.
    #[error("agent count {0} exceeds the supported maximum")]
    RosterTooLarge(usize),

    /// The same agent appears twice in one roster.
    #[error("agent '{0}' appears more than once in the roster")]
    DuplicateAgent(AgentName),

    /// The target branch is empty, contains whitespace or is too long.
    #[error("invalid target branch '{0}'")]
    InvalidTargetBranch(String),

    /// The pull request URL does not have an `http://` or `https://` prefix.
    #[error("pull request URL '{0}' must start with 'http://' or 'https://'")]
    InvalidPullRequestUrl(String),

    /// A status token does not name a task state.
    #[error(transparent)]
    UnknownTaskState(#[from] ParseTaskStateError),

    /// The plan has nothing to assign.
    #[error("plan {0} has no tasks to assign")]
    EmptyPlan(PlanId),

    /// A plan was submitted without any task definitions.
    #[error("a plan needs at least one task")]
    NoTaskDefinitions,

    /// A task cannot move to `assigned` without an agent to bind.
    #[error("task {0} cannot be assigned without an agent")]
    MissingAgent(TaskId),
}

/// Errors returned when an operation would violate a lifecycle rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictError {
    /// Transitioning a task between two states is not allowed.
    #[error("invalid task state transition for task {task_id}: {from} -> {to}")]
    InvalidTaskTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current state.
        from: TaskState,
        /// Requested state.
        to: TaskState,
    },

    /// Transitioning a request between two states is not allowed.
    #[error("invalid request state transition for request {request_id}: {from} -> {to}")]
    InvalidRequestTransition {
        /// Request identifier.
        request_id: RequestId,
        /// Current state.
        from: RequestState,
        /// Requested state.
        to: RequestState,
    },

    /// Transitioning an orchestration between two states is not allowed.
    #[error(
        "invalid orchestration state transition for orchestration {orchestration_id}: {from} -> {to}"
    )]
    InvalidOrchestrationTransition {
        /// Orchestration identifier.
        orchestration_id: OrchestrationId,
        /// Current state.
        from: OrchestrationState,
        /// Requested state.
        to: OrchestrationState,
    },

    /// The plan is already being worked by an orchestration that has not
    /// merged.
    #[error("plan {plan_id} already has active orchestration {orchestration_id}")]
    ActiveOrchestration {
        /// Plan identifier.
        plan_id: PlanId,
        /// The orchestration still in flight.
        orchestration_id: OrchestrationId,
    },

    /// A different agent than the bound one tried to act on the task.
    #[error("task {task_id} is bound to agent '{bound}', not '{actor}'")]
    AgentMismatch {
        /// Task identifier.
        task_id: TaskId,
        /// Agent currently bound to the task.
        bound: AgentName,
        /// Agent that attempted the operation.
        actor: AgentName,
    },

    /// The task already records a different pull request.
    #[error("task {task_id} already records pull request {existing}")]
    PullRequestAlreadyRecorded {
        /// Task identifier.
        task_id: TaskId,
        /// Pull request URL already on the task.
        existing: PullRequestUrl,
    },
}

/// Any rule violation raised by a domain operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A lifecycle rule was violated.
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    /// An agent-supplied path escapes its sandbox.
    #[error(transparent)]
    PathTraversal(#[from] PathTraversalError),
}

/// Error returned while parsing a task state token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Error returned while parsing a request state token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown request state: {0}")]
pub struct ParseRequestStateError(pub String);

/// Error returned while parsing an orchestration state token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown orchestration state: {0}")]
pub struct ParseOrchestrationStateError(pub String);
