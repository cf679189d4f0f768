//! Task query filter.

use super::{PlanId, Task, TaskState};

/// Conjunction of optional task predicates.
///
/// An empty filter matches every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    plan_id: Option<PlanId>,
    state: Option<TaskState>,
    agent: Option<String>,
}

impl TaskFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts matches to tasks of `plan_id`.
    #[must_use]
    pub const fn for_plan(mut self, plan_id: PlanId) -> Self {
        self.plan_id = Some(plan_id);
        self
    }

    /// Restricts matches to tasks in `state`.
    #[must_use]
    pub const fn in_state(mut self, state: TaskState) -> Self {
        self.state = Some(state);
        self
    }

    /// Restricts matches to tasks bound to `agent`.
    #[must_use]
    pub fn for_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Returns the plan predicate.
    #[must_use]
    pub const fn plan_id(&self) -> Option<PlanId> {
        self.plan_id
    }

    /// Returns the state predicate.
    #[must_use]
    pub const fn state(&self) -> Option<TaskState> {
        self.state
    }

    /// Returns the agent predicate.
    #[must_use]
    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    /// Returns whether `task` satisfies every supplied predicate.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let plan_matches = self.plan_id.is_none_or(|plan_id| task.plan_id() == plan_id);
        let state_matches = self.state.is_none_or(|state| task.state() == state);
        let agent_matches = self.agent.as_deref().is_none_or(|agent| {
            task.agent()
                .is_some_and(|bound| bound.as_str() == agent.trim())
        });

        plan_matches && state_matches && agent_matches
    }
}
