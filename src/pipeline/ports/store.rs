//! Store port for pipeline entities.

use crate::pipeline::domain::{
    EntityKind, EntityRef, Orchestration, OrchestrationId, Plan, PlanId, Request, RequestId, Task,
    TaskFilter, TaskId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for pipeline store operations.
pub type PipelineStoreResult<T> = Result<T, PipelineStoreError>;

/// Batch of entity upserts applied atomically by
/// [`PipelineStore::commit`].
///
/// Plans carry their tasks; standalone task entries replace the matching
/// task inside its plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreChanges {
    requests: Vec<Request>,
    plans: Vec<Plan>,
    tasks: Vec<Task>,
    orchestrations: Vec<Orchestration>,
}

impl StoreChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request upsert.
    #[must_use]
    pub fn with_request(mut self, request: Request) -> Self {
        self.requests.push(request);
        self
    }

    /// Adds a plan upsert, including all of its tasks.
    #[must_use]
    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plans.push(plan);
        self
    }

    /// Adds a task update.
    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Adds an orchestration upsert.
    #[must_use]
    pub fn with_orchestration(mut self, orchestration: Orchestration) -> Self {
        self.orchestrations.push(orchestration);
        self
    }

    /// Returns whether the change set holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
            && self.plans.is_empty()
            && self.tasks.is_empty()
            && self.orchestrations.is_empty()
    }

    /// Returns the request upserts.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Returns the plan upserts.
    #[must_use]
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Returns the task updates.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the orchestration upserts.
    #[must_use]
    pub fn orchestrations(&self) -> &[Orchestration] {
        &self.orchestrations
    }

    /// Splits the change set into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Request>, Vec<Plan>, Vec<Task>, Vec<Orchestration>) {
        (self.requests, self.plans, self.tasks, self.orchestrations)
    }
}

/// Pipeline entity storage contract.
#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Issues the next identifier for `kind`.
    ///
    /// Identifiers are never reused, even when the change set they were
    /// allocated for is never committed.
    fn next_id(&self, kind: EntityKind) -> u64;

    /// Applies every change in `changes` or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineStoreError::NotFound`] when a plan references an
    /// unknown request, a task update references an unknown plan or task, or
    /// an orchestration references an unknown plan.
    async fn commit(&self, changes: StoreChanges) -> PipelineStoreResult<()>;

    /// Finds a request by identifier.
    async fn find_request(&self, id: RequestId) -> PipelineStoreResult<Option<Request>>;

    /// Returns every request in identifier order.
    async fn list_requests(&self) -> PipelineStoreResult<Vec<Request>>;

    /// Finds a plan, with its tasks, by identifier.
    async fn find_plan(&self, id: PlanId) -> PipelineStoreResult<Option<Plan>>;

    /// Returns every plan in identifier order.
    async fn list_plans(&self) -> PipelineStoreResult<Vec<Plan>>;

    /// Returns the plans of `request_id` in identifier order.
    async fn plans_for_request(&self, request_id: RequestId) -> PipelineStoreResult<Vec<Plan>>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> PipelineStoreResult<Option<Task>>;

    /// Returns the tasks matching `filter` in identifier order.
    async fn list_tasks(&self, filter: &TaskFilter) -> PipelineStoreResult<Vec<Task>>;

    /// Finds an orchestration by identifier.
    async fn find_orchestration(
        &self,
        id: OrchestrationId,
    ) -> PipelineStoreResult<Option<Orchestration>>;

    /// Returns the orchestrations of `plan_id` in identifier order.
    async fn orchestrations_for_plan(
        &self,
        plan_id: PlanId,
    ) -> PipelineStoreResult<Vec<Orchestration>>;
}

/// Errors returned by pipeline store implementations.
#[derive(Debug, Clone, Error)]
pub enum PipelineStoreError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PipelineStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
