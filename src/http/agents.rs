//! Endpoints agents call to start work and report status.

use super::{ApiResult, AppState};
use crate::pipeline::{
    domain::{Task, TaskId},
    services::ReportStatusRequest,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/agents/{agent_name}/prs", post(report_status))
        .route("/agents/{agent_name}/tasks/{id}/start", post(start_task))
}

/// Status report body. Field names are snake case on the wire.
#[derive(Debug, Deserialize)]
struct ReportBody {
    task_id: u64,
    status: String,
    pr_url: Option<String>,
    #[serde(default)]
    changed_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReportAccepted {
    ok: bool,
    task: Task,
}

async fn report_status(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<ReportBody>, JsonRejection>,
) -> ApiResult<Json<ReportAccepted>> {
    let Path(agent_name) = path?;
    let Json(body) = payload?;

    let mut report = ReportStatusRequest::new(TaskId::new(body.task_id), body.status)
        .with_reporter(agent_name)
        .with_changed_paths(body.changed_paths);
    if let Some(pr_url) = body.pr_url {
        report = report.with_pr_url(pr_url);
    }

    let task = state.pipeline().report_status(report).await?;
    Ok(Json(ReportAccepted { ok: true, task }))
}

async fn start_task(
    State(state): State<AppState>,
    path: Result<Path<(String, u64)>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path((agent_name, id)) = path?;
    Ok(Json(
        state
            .pipeline()
            .start_task(TaskId::new(id), &agent_name)
            .await?,
    ))
}
