//! Plan inspection, orchestration and backlog endpoints.

use super::{AgentsBody, ApiResult, AppState, optional_json};
use crate::pipeline::{
    domain::{AgentSelection, Assignment, Plan, PlanId},
    services::OrchestratePlanRequest,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/plans/{id}", get(get_plan))
        .route("/plans/{id}/orchestrate", post(orchestrate))
        .route("/plans/{id}/backlog/assign", post(assign_backlog))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrchestrateBody {
    #[serde(default)]
    agents: AgentSelection,
    target_branch: Option<String>,
    #[serde(default)]
    dry_run: bool,
    #[serde(default)]
    replace: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrchestrationAccepted {
    orchestration_id: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct AssignmentsBody {
    pub(super) assignments: Vec<Assignment>,
}

async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<Plan>>> {
    Ok(Json(state.pipeline().list_plans().await?))
}

async fn get_plan(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Plan>> {
    let Path(id) = path?;
    Ok(Json(state.pipeline().get_plan(PlanId::new(id)).await?))
}

async fn orchestrate(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<OrchestrateBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrchestrationAccepted>)> {
    let Path(id) = path?;
    let Json(body) = payload?;

    let mut request = OrchestratePlanRequest::new(PlanId::new(id), body.agents)
        .with_dry_run(body.dry_run)
        .with_replace(body.replace);
    if let Some(target_branch) = body.target_branch {
        request = request.with_target_branch(target_branch);
    }

    let orchestration = state.pipeline().orchestrate(request).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(OrchestrationAccepted {
            orchestration_id: orchestration.id().value(),
        }),
    ))
}

/// Admits backlog tasks. Without a body the configured default roster is
/// used.
async fn assign_backlog(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    body: Bytes,
) -> ApiResult<Json<AssignmentsBody>> {
    let Path(id) = path?;
    let agents = optional_json::<AgentsBody>(&body)?.or_defaults(&state);
    let assignments = state
        .pipeline()
        .assign_backlog(PlanId::new(id), agents)
        .await?;
    Ok(Json(AssignmentsBody { assignments }))
}
