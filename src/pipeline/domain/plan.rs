//! Plan aggregate, task definitions and plan blueprints.

use super::{
    AgentName, AgentRoster, Assignment, ConflictError, PipelineDomainError, PlanId, RequestId,
    Task, TaskId, TaskState, ValidationError, backlog_admissions, round_robin,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Title and detail of the default three-step plan.
pub const STUB_TASKS: [(&str, &str); 3] = [
    ("Design API", "Draft API endpoints and data models"),
    ("Implement Feature", "Write code for the feature"),
    ("Write Tests", "Add unit tests for the feature"),
];

/// Returns the placeholder design document for `request_id`.
#[must_use]
pub fn stub_design_doc(request_id: RequestId) -> String {
    format!("Design document for request {request_id}")
}

/// Validated title and detail of a task before it receives an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    title: String,
    detail: String,
}

impl TaskDefinition {
    /// Creates a task definition.
    ///
    /// The title is trimmed; the detail is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTaskTitle`] when the title is empty
    /// after trimming.
    pub fn new(
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTaskTitle);
        }

        Ok(Self {
            title: trimmed.to_owned(),
            detail: detail.into(),
        })
    }

    /// Returns the stub definitions in order.
    #[must_use]
    pub fn stub() -> Vec<Self> {
        STUB_TASKS
            .iter()
            .map(|(title, detail)| Self {
                title: (*title).to_owned(),
                detail: (*detail).to_owned(),
            })
            .collect()
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

    pub(crate) fn into_parts(self) -> (String, String) {
        (self.title, self.detail)
    }
}

/// Content of a plan before it is attached to a request.
///
/// Missing parts fall back to the stub design document and the stub tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanBlueprint {
    design_doc: Option<String>,
    tasks: Option<Vec<TaskDefinition>>,
}

impl PlanBlueprint {
    /// Creates a blueprint that resolves entirely to the stub plan.
    #[must_use]
    pub fn stub() -> Self {
        Self::default()
    }

    /// Sets the design document.
    #[must_use]
    pub fn with_design_doc(mut self, design_doc: impl Into<String>) -> Self {
        self.design_doc = Some(design_doc.into());
        self
    }

    /// Sets the task definitions.
    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<TaskDefinition>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Returns the number of tasks the blueprint will create.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.as_ref().map_or(STUB_TASKS.len(), Vec::len)
    }

    /// Checks that the blueprint will produce at least one task.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoTaskDefinitions`] when the task list was
    /// set but is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tasks.as_ref().is_some_and(Vec::is_empty) {
            return Err(ValidationError::NoTaskDefinitions);
        }
        Ok(())
    }

    /// Resolves the design document and task definitions for `request_id`.
    #[must_use]
    pub fn resolve(self, request_id: RequestId) -> (String, Vec<TaskDefinition>) {
        let design_doc = self
            .design_doc
            .unwrap_or_else(|| stub_design_doc(request_id));
        let tasks = self.tasks.unwrap_or_else(TaskDefinition::stub);
        (design_doc, tasks)
    }
}

/// Design document plus the ordered tasks derived from a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    id: PlanId,
    request_id: RequestId,
    design_doc: String,
    tasks: Vec<Task>,
    created_at: DateTime<Utc>,
}

impl Plan {
    /// Creates a plan whose tasks all start unassigned.
    #[must_use]
    pub fn new(
        id: PlanId,
        request_id: RequestId,
        design_doc: String,
        tasks: Vec<(TaskId, TaskDefinition)>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            request_id,
            design_doc,
            tasks: tasks
                .into_iter()
                .map(|(task_id, definition)| Task::new(task_id, id, definition))
                .collect(),
            created_at: clock.utc(),
        }
    }

    /// Returns the plan identifier.
    #[must_use]
    pub const fn id(&self) -> PlanId {
        self.id
    }

    /// Returns the owning request.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the design document.
    #[must_use]
    pub fn design_doc(&self) -> &str {
        &self.design_doc
    }

    /// Returns the tasks in creation order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Looks up one of the plan's tasks.
    #[must_use]
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == task_id)
    }

    /// Returns whether every task of the plan is completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tasks
            .iter()
            .all(|task| task.state() == TaskState::Completed)
    }

    /// Replaces the stored copy of `task`.
    ///
    /// Returns `false` when the task does not belong to this plan.
    pub(crate) fn replace_task(&mut self, task: Task) -> bool {
        let Some(stored) = self.tasks.iter_mut().find(|stored| stored.id() == task.id()) else {
            return false;
        };
        *stored = task;
        true
    }

    /// Binds every task to the roster in round-robin order.
    ///
    /// Nothing changes unless every task can be assigned.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPlan`] when the plan has no tasks, or
    /// [`ConflictError::InvalidTaskTransition`] for the first task whose work
    /// has already started.
    pub fn assign_round_robin(
        &mut self,
        roster: &AgentRoster,
    ) -> Result<Vec<Assignment>, PipelineDomainError> {
        if self.tasks.is_empty() {
            return Err(ValidationError::EmptyPlan(self.id).into());
        }

        if let Some(started) = self
            .tasks
            .iter()
            .find(|task| !matches!(task.state(), TaskState::Unassigned | TaskState::Assigned))
        {
            return Err(ConflictError::InvalidTaskTransition {
                task_id: started.id(),
                from: started.state(),
                to: TaskState::Assigned,
            }
            .into());
        }

        let assignments = round_robin(self.tasks.iter().map(Task::id), roster);
        for (task, assignment) in self.tasks.iter_mut().zip(&assignments) {
            task.assign_to(assignment.agent().clone())?;
        }
        Ok(assignments)
    }

    /// Gives each idle roster agent at most one unassigned task.
    ///
    /// Agents receiving a task are added to `busy`.
    pub fn admit_backlog<S>(
        &mut self,
        roster: &AgentRoster,
        busy: &mut HashSet<AgentName, S>,
    ) -> Vec<Assignment>
    where
        S: std::hash::BuildHasher,
    {
        let candidates = backlog_admissions(&self.tasks, roster, busy);
        let mut admitted = Vec::with_capacity(candidates.len());
        for assignment in candidates {
            let Some(task) = self
                .tasks
                .iter_mut()
                .find(|task| task.id() == assignment.task_id())
            else {
                continue;
            };
            if task.assign_to(assignment.agent().clone()).is_ok() {
                busy.insert(assignment.agent().clone());
                admitted.push(assignment);
            }
        }
        admitted
    }

    pub(crate) fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == task_id)
    }
}
