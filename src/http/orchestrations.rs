//! Orchestration inspection and the recurring backlog poll.

use super::{AgentsBody, ApiResult, AppState, optional_json, plans::AssignmentsBody};
use crate::pipeline::domain::{Orchestration, OrchestrationId};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    routing::{get, post},
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/orchestrations/{id}", get(get_orchestration))
        .route("/orchestrations/{id}/conflict", post(flag_conflict))
        .route("/orchestrator/poll", post(poll))
}

async fn get_orchestration(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Orchestration>> {
    let Path(id) = path?;
    Ok(Json(
        state
            .pipeline()
            .get_orchestration(OrchestrationId::new(id))
            .await?,
    ))
}

async fn flag_conflict(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Orchestration>> {
    let Path(id) = path?;
    Ok(Json(
        state
            .pipeline()
            .flag_conflict(OrchestrationId::new(id))
            .await?,
    ))
}

/// One backlog admission round across every plan.
async fn poll(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<AssignmentsBody>> {
    let agents = optional_json::<AgentsBody>(&body)?.or_defaults(&state);
    let assignments = state.pipeline().poll_backlog(agents).await?;
    Ok(Json(AssignmentsBody { assignments }))
}
