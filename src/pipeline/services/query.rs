//! Read-only queries over pipeline entities.

use super::{PipelineResult, PipelineService};
use crate::pipeline::{
    domain::{
        Orchestration, OrchestrationId, Plan, PlanId, Request, RequestId, Task, TaskFilter, TaskId,
    },
    ports::PipelineStore,
};
use mockable::Clock;
use tracing::debug;

impl<S, C> PipelineService<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    /// Retrieves a request.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::NotFound`] for an unknown request.
    pub async fn get_request(&self, id: RequestId) -> PipelineResult<Request> {
        self.require_request(id).await
    }

    /// Lists every request in identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::Store`] when the store fails.
    pub async fn list_requests(&self) -> PipelineResult<Vec<Request>> {
        Ok(self.store.list_requests().await?)
    }

    /// Retrieves a plan with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::NotFound`] for an unknown plan.
    pub async fn get_plan(&self, id: PlanId) -> PipelineResult<Plan> {
        self.require_plan(id).await
    }

    /// Lists every plan in identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::Store`] when the store fails.
    pub async fn list_plans(&self) -> PipelineResult<Vec<Plan>> {
        Ok(self.store.list_plans().await?)
    }

    /// Retrieves a task.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::NotFound`] for an unknown task.
    pub async fn get_task(&self, id: TaskId) -> PipelineResult<Task> {
        self.require_task(id).await
    }

    /// Lists the tasks matching every predicate of `filter`, in identifier
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::Store`] when the store fails.
    pub async fn list_tasks(&self, filter: &TaskFilter) -> PipelineResult<Vec<Task>> {
        let tasks = self.store.list_tasks(filter).await?;
        debug!(?filter, matched = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    /// Retrieves an orchestration.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::NotFound`] for an unknown
    /// orchestration.
    pub async fn get_orchestration(&self, id: OrchestrationId) -> PipelineResult<Orchestration> {
        self.require_orchestration(id).await
    }

    /// Lists the orchestrations of a plan in identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::NotFound`] for an unknown plan.
    pub async fn orchestrations_for_plan(
        &self,
        plan_id: PlanId,
    ) -> PipelineResult<Vec<Orchestration>> {
        self.require_plan(plan_id).await?;
        Ok(self.store.orchestrations_for_plan(plan_id).await?)
    }
}
