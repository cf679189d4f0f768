//! Orchestration snapshot and orchestration lifecycle state.

use super::{
    AgentRoster, Assignment, BranchName, ConflictError, OrchestrationId,
    ParseOrchestrationStateError, Plan, PlanId, TaskState,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orchestration lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationState {
    /// Tasks have been handed to agents.
    Assigned,
    /// Agents reported conflicting work that needs attention.
    Conflict,
    /// Every assigned task has completed.
    Merged,
}

impl OrchestrationState {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Conflict => "conflict",
            Self::Merged => "merged",
        }
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Assigned, Self::Conflict | Self::Merged) | (Self::Conflict, Self::Merged)
        )
    }

    /// Returns whether the orchestration still blocks a new one for its plan.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Merged)
    }
}

impl fmt::Display for OrchestrationState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OrchestrationState {
    type Error = ParseOrchestrationStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "assigned" => Ok(Self::Assigned),
            "conflict" => Ok(Self::Conflict),
            "merged" => Ok(Self::Merged),
            _ => Err(ParseOrchestrationStateError(value.to_owned())),
        }
    }
}

/// Immutable record of how a plan's tasks were distributed.
///
/// Only the lifecycle state evolves after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orchestration {
    id: OrchestrationId,
    plan_id: PlanId,
    agents: AgentRoster,
    target_branch: BranchName,
    dry_run: bool,
    tasks: Vec<Assignment>,
    state: OrchestrationState,
    created_at: DateTime<Utc>,
}

/// Parameters of a new orchestration snapshot.
#[derive(Debug, Clone)]
pub struct OrchestrationSnapshot {
    /// Roster used for the assignment.
    pub agents: AgentRoster,
    /// Branch agents should target.
    pub target_branch: BranchName,
    /// Whether agents should avoid side effects.
    pub dry_run: bool,
    /// Assignments made, in task order.
    pub tasks: Vec<Assignment>,
}

impl Orchestration {
    /// Records a new orchestration in [`OrchestrationState::Assigned`].
    #[must_use]
    pub fn new(
        id: OrchestrationId,
        plan_id: PlanId,
        snapshot: OrchestrationSnapshot,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            plan_id,
            agents: snapshot.agents,
            target_branch: snapshot.target_branch,
            dry_run: snapshot.dry_run,
            tasks: snapshot.tasks,
            state: OrchestrationState::Assigned,
            created_at: clock.utc(),
        }
    }

    /// Returns the orchestration identifier.
    #[must_use]
    pub const fn id(&self) -> OrchestrationId {
        self.id
    }

    /// Returns the orchestrated plan.
    #[must_use]
    pub const fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    /// Returns the roster in assignment order.
    #[must_use]
    pub const fn agents(&self) -> &AgentRoster {
        &self.agents
    }

    /// Returns the target branch.
    #[must_use]
    pub const fn target_branch(&self) -> &BranchName {
        &self.target_branch
    }

    /// Returns whether the orchestration was requested as a dry run.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the assignments made.
    #[must_use]
    pub fn tasks(&self) -> &[Assignment] {
        &self.tasks
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> OrchestrationState {
        self.state
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the orchestration has not merged yet.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Moves to `merged` once every assigned task of `plan` is completed.
    ///
    /// Returns whether the state changed.
    #[must_use]
    pub fn refresh(&mut self, plan: &Plan) -> bool {
        if !self.is_active() {
            return false;
        }

        let all_completed = self.tasks.iter().all(|assignment| {
            plan.task(assignment.task_id())
                .is_some_and(|task| task.state() == TaskState::Completed)
        });

        if all_completed {
            self.state = OrchestrationState::Merged;
        }
        all_completed
    }

    /// Flags the orchestration as conflicted.
    ///
    /// Returns `false` when it was already flagged.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidOrchestrationTransition`] when the
    /// orchestration has already merged.
    pub fn flag_conflict(&mut self) -> Result<bool, ConflictError> {
        if self.state == OrchestrationState::Conflict {
            return Ok(false);
        }
        self.transition_to(OrchestrationState::Conflict)?;
        Ok(true)
    }

    fn transition_to(&mut self, target: OrchestrationState) -> Result<(), ConflictError> {
        if !self.state.can_transition_to(target) {
            return Err(ConflictError::InvalidOrchestrationTransition {
                orchestration_id: self.id,
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }
}
