//! Planning workflow endpoint.

use super::{ApiError, ApiResult, AppState};
use crate::pipeline::{
    domain::{AgentSelection, Assignment, Task},
    ports::ExternalServiceError,
    services::{NewRequest, PipelineError},
};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};

const STARTED_STATUS: &str = "Workflow started. Tickets assigned to agents.";

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/workflow", post(run_workflow))
}

/// Either free-form `input` or an explicit title and description.
#[derive(Debug, Deserialize)]
struct WorkflowBody {
    input: Option<String>,
    title: Option<String>,
    description: Option<String>,
    agents: Option<AgentSelection>,
}

impl WorkflowBody {
    fn new_request(&mut self) -> Option<NewRequest> {
        let request = match (self.input.take(), self.title.take()) {
            (_, Some(title)) => {
                let description = self.description.take().unwrap_or_default();
                NewRequest::new(title).with_description(description)
            }
            (Some(input), None) => NewRequest::new(input.clone()).with_description(input),
            (None, None) => return None,
        };
        Some(request).filter(|candidate| !candidate.title().trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanSummary {
    id: u64,
    design_doc: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowStarted {
    request_id: u64,
    plan: PlanSummary,
    tickets: Vec<Task>,
    assignments: Vec<Assignment>,
    status: &'static str,
}

async fn run_workflow(
    State(state): State<AppState>,
    payload: Result<Json<WorkflowBody>, JsonRejection>,
) -> ApiResult<Json<WorkflowStarted>> {
    let Json(mut body) = payload?;
    let request = body
        .new_request()
        .ok_or_else(|| ApiError::BadRequest("Missing input".to_owned()))?;
    let agents = body
        .agents
        .unwrap_or_else(|| AgentSelection::from(&state.default_agents));

    let workflow = state
        .workflow
        .as_ref()
        .ok_or(PipelineError::ExternalService(ExternalServiceError::NotConfigured))?;
    let outcome = workflow.run(request, agents).await?;

    Ok(Json(WorkflowStarted {
        request_id: outcome.request.id().value(),
        plan: PlanSummary {
            id: outcome.plan.id().value(),
            design_doc: outcome.plan.design_doc().to_owned(),
        },
        tickets: outcome.plan.tasks().to_vec(),
        assignments: outcome.assignments,
        status: STARTED_STATUS,
    }))
}
