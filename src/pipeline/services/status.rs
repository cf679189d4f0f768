//! Status-report protocol used by agents to close the loop on tasks.

use super::{PipelineError, PipelineResult, PipelineService};
use crate::pipeline::{
    domain::{
        AgentName, PullRequestUrl, SandboxPath, StatusReport, Task, TaskId, TaskState,
    },
    ports::{PipelineStore, StoreChanges},
};
use mockable::Clock;
use tracing::{debug, info, warn};

/// Raw status report as received from an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStatusRequest {
    task_id: TaskId,
    status: String,
    pr_url: Option<String>,
    reporter: Option<String>,
    changed_paths: Vec<String>,
}

impl ReportStatusRequest {
    /// Creates a report moving `task_id` to the state named by `status`.
    #[must_use]
    pub fn new(task_id: TaskId, status: impl Into<String>) -> Self {
        Self {
            task_id,
            status: status.into(),
            pr_url: None,
            reporter: None,
            changed_paths: Vec::new(),
        }
    }

    /// Sets the pull request URL.
    #[must_use]
    pub fn with_pr_url(mut self, pr_url: impl Into<String>) -> Self {
        self.pr_url = Some(pr_url.into());
        self
    }

    /// Names the reporting agent.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Into<String>) -> Self {
        self.reporter = Some(reporter.into());
        self
    }

    /// Sets the paths the agent touched, relative to its sandbox.
    #[must_use]
    pub fn with_changed_paths(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.changed_paths = paths.into_iter().collect();
        self
    }

    /// Validates every field into a [`StatusReport`].
    fn into_report(self) -> PipelineResult<StatusReport> {
        let status = TaskState::try_from(self.status.as_str())?;
        let mut report = StatusReport::new(self.task_id, status);

        if let Some(pr_url) = self.pr_url {
            report = report.with_pr_url(PullRequestUrl::new(pr_url)?);
        }
        if let Some(reporter) = self.reporter {
            report = report.with_reporter(AgentName::new(reporter)?);
        }

        let changed_paths = self
            .changed_paths
            .iter()
            .map(String::as_str)
            .map(SandboxPath::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(report.with_changed_paths(changed_paths))
    }
}

impl<S, C> PipelineService<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    /// Applies an agent status report to a task.
    ///
    /// Repeating an accepted report changes nothing. When the task reaches
    /// `completed`, orchestrations of its plan and its owning request are
    /// refreshed in the same commit.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] for an unknown status token, an
    /// invalid URL or agent name, or an assignment without an agent;
    /// [`PipelineError::PathTraversal`] when a changed path leaves the
    /// sandbox; [`PipelineError::NotFound`] for an unknown task; and
    /// [`PipelineError::Conflict`] for backward transitions, reporter
    /// mismatches and conflicting pull request URLs.
    pub async fn report_status(&self, payload: ReportStatusRequest) -> PipelineResult<Task> {
        let task_id = payload.task_id;
        let report = payload
            .into_report()
            .inspect_err(|err| warn!(task_id = %task_id, error = %err, "status report rejected"))?;

        let _guard = self.lock().await;
        let mut task = self.require_task(task_id).await?;
        let previous_state = task.state();

        let outcome = task
            .apply_report(&report)
            .map_err(PipelineError::from)
            .inspect_err(|err| warn!(task_id = %task_id, error = %err, "status report rejected"))?;

        if !outcome.is_updated() {
            debug!(task_id = %task_id, state = %task.state(), "status report repeated");
            return Ok(task);
        }

        let mut changes = StoreChanges::new().with_task(task.clone());
        if task.state() == TaskState::Completed {
            changes = self.completion_changes(&task, changes).await?;
        }
        self.store.commit(changes).await?;

        info!(
            task_id = %task_id,
            from = %previous_state,
            to = %task.state(),
            "task status reported"
        );
        Ok(task)
    }

    /// Adds the orchestration and request refreshes caused by `task`
    /// completing.
    async fn completion_changes(
        &self,
        task: &Task,
        mut changes: StoreChanges,
    ) -> PipelineResult<StoreChanges> {
        let mut plan = self.require_plan(task.plan_id()).await?;
        plan.replace_task(task.clone());

        for mut orchestration in self.store.orchestrations_for_plan(plan.id()).await? {
            if orchestration.refresh(&plan) {
                info!(orchestration_id = %orchestration.id(), "orchestration merged");
                changes = changes.with_orchestration(orchestration);
            }
        }

        let sibling_plans = self.store.plans_for_request(plan.request_id()).await?;
        let request_complete = sibling_plans
            .iter()
            .filter(|sibling| sibling.id() != plan.id())
            .all(|sibling| sibling.is_complete())
            && plan.is_complete();

        if request_complete {
            let mut request = self.require_request(plan.request_id()).await?;
            if request.record_completion()? {
                info!(request_id = %request.id(), "request completed");
                changes = changes.with_request(request);
            }
        }

        Ok(changes)
    }
}
