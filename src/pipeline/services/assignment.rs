//! Assignment operations: orchestration, backlog admission and task start.

use super::{PipelineResult, PipelineService};
use crate::pipeline::{
    domain::{
        AgentName, AgentRoster, AgentSelection, Assignment, BranchName, ConflictError,
        EntityKind, Orchestration, OrchestrationId, OrchestrationSnapshot, PlanId, Task,
        TaskFilter, TaskId, TaskState, busy_agents,
    },
    ports::{PipelineStore, StoreChanges},
};
use mockable::Clock;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Payload for orchestrating a plan across a roster of agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratePlanRequest {
    plan_id: PlanId,
    agents: AgentSelection,
    target_branch: Option<String>,
    dry_run: bool,
    replace: bool,
}

impl OrchestratePlanRequest {
    /// Creates a payload for `plan_id` with the given agents.
    #[must_use]
    pub const fn new(plan_id: PlanId, agents: AgentSelection) -> Self {
        Self {
            plan_id,
            agents,
            target_branch: None,
            dry_run: false,
            replace: false,
        }
    }

    /// Sets the branch agents should target. Defaults to `main`.
    #[must_use]
    pub fn with_target_branch(mut self, target_branch: impl Into<String>) -> Self {
        self.target_branch = Some(target_branch.into());
        self
    }

    /// Records the orchestration as a dry run.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Allows replacing an active orchestration of the same plan.
    #[must_use]
    pub const fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

impl<S, C> PipelineService<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    /// Binds every task of a plan to the roster in round-robin order and
    /// records the decision as a new orchestration.
    ///
    /// The task updates, the orchestration and the request's move to
    /// `orchestrating` are committed together.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`](super::PipelineError::Validation) for an invalid roster or branch
    /// or an empty plan, [`PipelineError::NotFound`](super::PipelineError::NotFound) for an unknown plan, and
    /// [`PipelineError::Conflict`](super::PipelineError::Conflict) when an active orchestration exists and
    /// `replace` is not set, or when work on a task has already started.
    pub async fn orchestrate(
        &self,
        payload: OrchestratePlanRequest,
    ) -> PipelineResult<Orchestration> {
        let roster = payload.agents.into_roster()?;
        let target_branch = payload
            .target_branch
            .map(BranchName::new)
            .transpose()?
            .unwrap_or_default();
        let plan_id = payload.plan_id;

        let _guard = self.lock().await;
        let mut plan = self.require_plan(plan_id).await?;

        if !payload.replace {
            let existing = self.store.orchestrations_for_plan(plan_id).await?;
            if let Some(active) = existing.iter().find(|orchestration| orchestration.is_active()) {
                warn!(
                    plan_id = %plan_id,
                    orchestration_id = %active.id(),
                    "orchestration rejected: plan already orchestrated"
                );
                return Err(ConflictError::ActiveOrchestration {
                    plan_id,
                    orchestration_id: active.id(),
                }
                .into());
            }
        }

        let assignments = plan
            .assign_round_robin(&roster)
            .inspect_err(|err| warn!(plan_id = %plan_id, error = %err, "orchestration rejected"))?;

        let mut request = self.require_request(plan.request_id()).await?;
        let request_changed = request.record_orchestration_started()?;

        let orchestration_id = OrchestrationId::new(self.store.next_id(EntityKind::Orchestration));
        let orchestration = Orchestration::new(
            orchestration_id,
            plan_id,
            OrchestrationSnapshot {
                agents: roster,
                target_branch,
                dry_run: payload.dry_run,
                tasks: assignments,
            },
            &*self.clock,
        );

        let mut changes = StoreChanges::new()
            .with_plan(plan)
            .with_orchestration(orchestration.clone());
        if request_changed {
            changes = changes.with_request(request);
        }
        self.store.commit(changes).await?;

        info!(
            plan_id = %plan_id,
            orchestration_id = %orchestration_id,
            agents = orchestration.agents().len(),
            dry_run = orchestration.dry_run(),
            "plan orchestrated"
        );
        Ok(orchestration)
    }

    /// Gives each idle agent at most one unassigned task of `plan_id`.
    ///
    /// An agent is idle when it holds no task in `assigned` state in any
    /// plan. No orchestration is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`](super::PipelineError::Validation) for an invalid roster or
    /// [`PipelineError::NotFound`](super::PipelineError::NotFound) for an unknown plan.
    pub async fn assign_backlog(
        &self,
        plan_id: PlanId,
        agents: AgentSelection,
    ) -> PipelineResult<Vec<Assignment>> {
        let roster = agents.into_roster()?;
        self.admit_plan_backlog(plan_id, &roster).await
    }

    /// Runs one backlog admission round over every plan in identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`](super::PipelineError::Validation) for an invalid roster or
    /// [`PipelineError::Store`](super::PipelineError::Store) when the store fails.
    pub async fn poll_backlog(&self, agents: AgentSelection) -> PipelineResult<Vec<Assignment>> {
        let roster = agents.into_roster()?;

        let _guard = self.lock().await;
        let mut busy = self.agents_with_assigned_tasks().await?;
        let mut changes = StoreChanges::new();
        let mut assignments = Vec::new();

        for mut plan in self.store.list_plans().await? {
            if roster.iter().all(|agent| busy.contains(agent)) {
                break;
            }
            let admitted = plan.admit_backlog(&roster, &mut busy);
            if !admitted.is_empty() {
                assignments.extend(admitted);
                changes = changes.with_plan(plan);
            }
        }

        if changes.is_empty() {
            debug!("backlog poll found nothing to assign");
            return Ok(assignments);
        }

        self.store.commit(changes).await?;
        info!(assigned = assignments.len(), "backlog poll assigned tasks");
        Ok(assignments)
    }

    /// Marks a task as in progress for its bound agent.
    ///
    /// Starting a task that is already in progress is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`](super::PipelineError::Validation) for an invalid agent name,
    /// [`PipelineError::NotFound`](super::PipelineError::NotFound) for an unknown task, and
    /// [`PipelineError::Conflict`](super::PipelineError::Conflict) when the agent is not bound to the task or
    /// the task is not assigned.
    pub async fn start_task(&self, task_id: TaskId, agent: &str) -> PipelineResult<Task> {
        let agent_name = AgentName::new(agent)?;

        let _guard = self.lock().await;
        let mut task = self.require_task(task_id).await?;
        if task.start(&agent_name)? {
            self.store
                .commit(StoreChanges::new().with_task(task.clone()))
                .await?;
            info!(task_id = %task_id, agent = %agent_name, "task started");
        }
        Ok(task)
    }

    /// Flags an orchestration as conflicted.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`](super::PipelineError::NotFound) for an unknown orchestration or
    /// [`PipelineError::Conflict`](super::PipelineError::Conflict) when it has already merged.
    pub async fn flag_conflict(
        &self,
        orchestration_id: OrchestrationId,
    ) -> PipelineResult<Orchestration> {
        let _guard = self.lock().await;
        let mut orchestration = self.require_orchestration(orchestration_id).await?;
        if orchestration.flag_conflict()? {
            self.store
                .commit(StoreChanges::new().with_orchestration(orchestration.clone()))
                .await?;
            warn!(orchestration_id = %orchestration_id, "orchestration flagged as conflicted");
        }
        Ok(orchestration)
    }

    pub(super) async fn admit_plan_backlog(
        &self,
        plan_id: PlanId,
        roster: &AgentRoster,
    ) -> PipelineResult<Vec<Assignment>> {
        let _guard = self.lock().await;
        let mut plan = self.require_plan(plan_id).await?;
        let mut busy = self.agents_with_assigned_tasks().await?;

        let assignments = plan.admit_backlog(roster, &mut busy);
        if assignments.is_empty() {
            debug!(plan_id = %plan_id, "no backlog task admitted");
            return Ok(assignments);
        }

        self.store.commit(StoreChanges::new().with_plan(plan)).await?;
        info!(plan_id = %plan_id, assigned = assignments.len(), "backlog tasks assigned");
        Ok(assignments)
    }

    async fn agents_with_assigned_tasks(&self) -> PipelineResult<HashSet<AgentName>> {
        let assigned = self
            .store
            .list_tasks(&TaskFilter::new().in_state(TaskState::Assigned))
            .await?;
        Ok(busy_agents(&assigned))
    }
}

