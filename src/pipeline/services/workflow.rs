//! End-to-end planning workflow driven by an external plan generator.

use super::{NewRequest, PipelineResult, PipelineService};
use crate::pipeline::{
    domain::{AgentSelection, Assignment, Plan, Request, decode_tickets},
    ports::{ExternalServiceError, PipelineStore, PlanGenerator, PlanGeneratorResult},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default bound on each generator call.
pub const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of one planning workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    /// The request created for the input.
    pub request: Request,
    /// The generated plan, reflecting the assignments made.
    pub plan: Plan,
    /// Backlog assignments made for the roster.
    pub assignments: Vec<Assignment>,
}

/// Turns free-form input into a request, a generated plan and a first round
/// of backlog assignments.
pub struct PlanningWorkflow<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    pipeline: PipelineService<S, C>,
    generator: Arc<dyn PlanGenerator>,
    timeout: Duration,
}

impl<S, C> Clone for PlanningWorkflow<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            generator: Arc::clone(&self.generator),
            timeout: self.timeout,
        }
    }
}

impl<S, C> PlanningWorkflow<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    /// Creates a workflow using [`DEFAULT_GENERATOR_TIMEOUT`].
    #[must_use]
    pub fn new(pipeline: PipelineService<S, C>, generator: Arc<dyn PlanGenerator>) -> Self {
        Self {
            pipeline,
            generator,
            timeout: DEFAULT_GENERATOR_TIMEOUT,
        }
    }

    /// Sets the bound applied to each generator call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the workflow.
    ///
    /// Generator calls happen outside the pipeline's mutation gate and before
    /// anything is stored. The request and its plan are committed together
    /// once the tickets decode, so a failing generator leaves no trace.
    ///
    /// # Errors
    ///
    /// Returns [`super::PipelineError::Validation`] for a blank title or an
    /// invalid roster, and [`super::PipelineError::ExternalService`] when the
    /// generator fails, times out, or returns an empty design or unusable
    /// tickets.
    pub async fn run(
        &self,
        payload: NewRequest,
        agents: AgentSelection,
    ) -> PipelineResult<WorkflowOutcome> {
        let roster = agents.into_roster()?;
        let details = payload.into_details()?;

        let design_doc = self.bounded(self.generator.design(&details)).await?;
        if design_doc.trim().is_empty() {
            warn!(title = details.title(), "generator returned an empty design");
            return Err(ExternalServiceError::EmptyDesign.into());
        }

        let raw_tickets = self.bounded(self.generator.tickets(&design_doc)).await?;
        let tasks = decode_tickets(&raw_tickets)
            .map_err(ExternalServiceError::from)
            .inspect_err(|err| {
                warn!(title = details.title(), error = %err, "generator tickets rejected");
            })?;

        let (request, plan) = self
            .pipeline
            .create_planned_request(details, design_doc, tasks)
            .await?;
        let assignments = self.pipeline.admit_plan_backlog(plan.id(), &roster).await?;
        let assigned_plan = self.pipeline.get_plan(plan.id()).await?;

        info!(
            request_id = %request.id(),
            plan_id = %assigned_plan.id(),
            tickets = assigned_plan.tasks().len(),
            assigned = assignments.len(),
            "planning workflow finished"
        );
        Ok(WorkflowOutcome {
            request,
            plan: assigned_plan,
            assignments,
        })
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = PlanGeneratorResult<T>>,
    ) -> Result<T, ExternalServiceError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_elapsed| ExternalServiceError::Timeout(self.timeout))?
    }
}
