//! Task listing and lookup.

use super::{ApiResult, AppState};
use crate::pipeline::domain::{PlanId, Task, TaskFilter, TaskId, TaskState, ValidationError};
use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::PathRejection, rejection::QueryRejection},
    routing::get,
};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/{id}", get(get_task))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskQuery {
    plan_id: Option<u64>,
    state: Option<String>,
    agent: Option<String>,
}

impl TaskQuery {
    fn into_filter(self) -> Result<TaskFilter, ValidationError> {
        let mut filter = TaskFilter::new();
        if let Some(plan_id) = self.plan_id {
            filter = filter.for_plan(PlanId::new(plan_id));
        }
        if let Some(state) = self.state {
            filter = filter.in_state(TaskState::try_from(state.as_str())?);
        }
        if let Some(agent) = self.agent {
            filter = filter.for_agent(agent);
        }
        Ok(filter)
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(params) = query?;
    let filter = params.into_filter()?;
    Ok(Json(state.pipeline().list_tasks(&filter).await?))
}

async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    Ok(Json(state.pipeline().get_task(TaskId::new(id)).await?))
}
