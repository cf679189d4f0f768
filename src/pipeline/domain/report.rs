//! Agent status report value object.

use super::{AgentName, PullRequestUrl, SandboxPath, TaskId, TaskState};

/// Validated status update sent by an agent for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    task_id: TaskId,
    status: TaskState,
    pr_url: Option<PullRequestUrl>,
    reporter: Option<AgentName>,
    changed_paths: Vec<SandboxPath>,
}

impl StatusReport {
    /// Creates a report moving `task_id` to `status`.
    #[must_use]
    pub const fn new(task_id: TaskId, status: TaskState) -> Self {
        Self {
            task_id,
            status,
            pr_url: None,
            reporter: None,
            changed_paths: Vec::new(),
        }
    }

    /// Attaches the pull request produced for the task.
    #[must_use]
    pub fn with_pr_url(mut self, pr_url: PullRequestUrl) -> Self {
        self.pr_url = Some(pr_url);
        self
    }

    /// Names the agent sending the report.
    #[must_use]
    pub fn with_reporter(mut self, reporter: AgentName) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Records the sandbox paths the agent touched.
    #[must_use]
    pub fn with_changed_paths(mut self, changed_paths: Vec<SandboxPath>) -> Self {
        self.changed_paths = changed_paths;
        self
    }

    /// Returns the reported task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the requested task state.
    #[must_use]
    pub const fn status(&self) -> TaskState {
        self.status
    }

    /// Returns the reported pull request, if any.
    #[must_use]
    pub const fn pr_url(&self) -> Option<&PullRequestUrl> {
        self.pr_url.as_ref()
    }

    /// Returns the reporting agent, if named.
    #[must_use]
    pub const fn reporter(&self) -> Option<&AgentName> {
        self.reporter.as_ref()
    }

    /// Returns the reported changed paths.
    #[must_use]
    pub fn changed_paths(&self) -> &[SandboxPath] {
        &self.changed_paths
    }
}

/// Effect of applying a [`StatusReport`] to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report repeated what the task already records.
    Unchanged,
    /// The task changed.
    Updated,
}

impl ReportOutcome {
    /// Returns whether the task was modified.
    #[must_use]
    pub const fn is_updated(self) -> bool {
        matches!(self, Self::Updated)
    }
}
