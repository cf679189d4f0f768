//! Task aggregate and task lifecycle state.

use super::{
    AgentName, ConflictError, ParseTaskStateError, PipelineDomainError, PlanId, PullRequestUrl,
    ReportOutcome, SandboxPath, StatusReport, TaskDefinition, TaskId, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task lifecycle state.
///
/// States are ordered; a task only ever moves towards
/// [`TaskState::Completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Task is in the backlog with no agent bound.
    Unassigned,
    /// Task is bound to an agent but work has not started.
    Assigned,
    /// The bound agent is working on the task.
    InProgress,
    /// Work on the task has finished.
    Completed,
}

impl TaskState {
    /// Every task state in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Unassigned,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
    ];

    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Assigned => "assigned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Unassigned => 0,
            Self::Assigned => 1,
            Self::InProgress => 2,
            Self::Completed => 3,
        }
    }

    /// Returns whether moving to `target` goes strictly forward.
    ///
    /// Skipping intermediate states is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        target.rank() > self.rank()
    }

    /// Returns whether moving to `target` would go backwards.
    #[must_use]
    pub const fn is_regression_to(self, target: Self) -> bool {
        target.rank() < self.rank()
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    /// Parses a status token.
    ///
    /// Accepts `backlog` as an alias of `unassigned` and `in_progress` as an
    /// alias of `in-progress`.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unassigned" | "backlog" => Ok(Self::Unassigned),
            "assigned" => Ok(Self::Assigned),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

impl FromStr for TaskState {
    type Err = ParseTaskStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}

/// Atomic unit of engineering work owned by a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    plan_id: PlanId,
    title: String,
    detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent: Option<AgentName>,
    state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pr_url: Option<PullRequestUrl>,
    #[serde(default)]
    changed_paths: Vec<SandboxPath>,
}

impl Task {
    /// Creates an unassigned task from its definition.
    #[must_use]
    pub(crate) fn new(id: TaskId, plan_id: PlanId, definition: TaskDefinition) -> Self {
        let (title, detail) = definition.into_parts();
        Self {
            id,
            plan_id,
            title,
            detail,
            agent: None,
            state: TaskState::Unassigned,
            pr_url: None,
            changed_paths: Vec::new(),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning plan.
    #[must_use]
    pub const fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns the bound agent, if any.
    #[must_use]
    pub const fn agent(&self) -> Option<&AgentName> {
        self.agent.as_ref()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the recorded pull request, if any.
    #[must_use]
    pub const fn pr_url(&self) -> Option<&PullRequestUrl> {
        self.pr_url.as_ref()
    }

    /// Returns the sandbox paths reported for this task.
    #[must_use]
    pub fn changed_paths(&self) -> &[SandboxPath] {
        &self.changed_paths
    }

    /// Returns whether the task is bound to `agent`.
    #[must_use]
    pub fn is_bound_to(&self, agent: &AgentName) -> bool {
        self.agent.as_ref() == Some(agent)
    }

    /// Binds the task to `agent` and moves it to [`TaskState::Assigned`].
    ///
    /// An already assigned task is rebound.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidTaskTransition`] when work on the task
    /// has already started.
    pub fn assign_to(&mut self, agent: AgentName) -> Result<(), ConflictError> {
        if !matches!(self.state, TaskState::Unassigned | TaskState::Assigned) {
            return Err(self.transition_conflict(TaskState::Assigned));
        }

        self.agent = Some(agent);
        self.state = TaskState::Assigned;
        Ok(())
    }

    /// Marks the task as in progress on behalf of its bound agent.
    ///
    /// Returns `false` when the task was already in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::AgentMismatch`] when `agent` is not the bound
    /// agent, or [`ConflictError::InvalidTaskTransition`] when the task is not
    /// assigned.
    pub fn start(&mut self, agent: &AgentName) -> Result<bool, ConflictError> {
        if let Some(bound) = self.agent.as_ref().filter(|_| !self.is_bound_to(agent)) {
            return Err(ConflictError::AgentMismatch {
                task_id: self.id,
                bound: bound.clone(),
                actor: agent.clone(),
            });
        }

        match self.state {
            TaskState::InProgress => Ok(false),
            TaskState::Assigned => {
                self.state = TaskState::InProgress;
                Ok(true)
            }
            TaskState::Unassigned | TaskState::Completed => {
                Err(self.transition_conflict(TaskState::InProgress))
            }
        }
    }

    /// Applies an agent status report.
    ///
    /// Every rule is checked before anything changes, so a rejected report
    /// leaves the task untouched. Repeating an accepted report yields
    /// [`ReportOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns a conflict for backward transitions, reporter mismatches and
    /// a second, different pull request URL, and a validation error when the
    /// task would be assigned without any agent.
    pub fn apply_report(
        &mut self,
        report: &StatusReport,
    ) -> Result<ReportOutcome, PipelineDomainError> {
        let target = report.status();

        if self.state.is_regression_to(target) {
            return Err(self.transition_conflict(target).into());
        }

        if let Some((bound, reporter)) = self
            .agent
            .as_ref()
            .zip(report.reporter())
            .filter(|(_, reporter)| !self.is_bound_to(reporter))
        {
            return Err(ConflictError::AgentMismatch {
                task_id: self.id,
                bound: bound.clone(),
                actor: reporter.clone(),
            }
            .into());
        }

        let binds_reporter = self.agent.is_none() && target != TaskState::Unassigned;
        if target == TaskState::Assigned && self.agent.is_none() && report.reporter().is_none() {
            return Err(ValidationError::MissingAgent(self.id).into());
        }

        if let Some(existing) = self
            .pr_url
            .as_ref()
            .zip(report.pr_url())
            .filter(|(existing, reported)| existing != reported)
            .map(|(existing, _)| existing)
        {
            return Err(ConflictError::PullRequestAlreadyRecorded {
                task_id: self.id,
                existing: existing.clone(),
            }
            .into());
        }

        let mut outcome = ReportOutcome::Unchanged;

        if target != self.state {
            self.state = target;
            outcome = ReportOutcome::Updated;
        }

        if let Some(reporter) = report.reporter().filter(|_| binds_reporter) {
            self.agent = Some(reporter.clone());
            outcome = ReportOutcome::Updated;
        }

        if let Some(pr_url) = report.pr_url().filter(|_| self.pr_url.is_none()) {
            self.pr_url = Some(pr_url.clone());
            outcome = ReportOutcome::Updated;
        }

        for path in report.changed_paths() {
            if !self.changed_paths.contains(path) {
                self.changed_paths.push(path.clone());
                outcome = ReportOutcome::Updated;
            }
        }

        Ok(outcome)
    }

    const fn transition_conflict(&self, target: TaskState) -> ConflictError {
        ConflictError::InvalidTaskTransition {
            task_id: self.id,
            from: self.state,
            to: target,
        }
    }
}
