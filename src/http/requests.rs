//! Request intake and plan attachment endpoints.

use super::{ApiResult, AppState, optional_json};
use crate::pipeline::{
    domain::{PlanBlueprint, Request, RequestId, TaskDefinition, ValidationError},
    services::NewRequest,
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
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}/plans", post(create_plan))
}

#[derive(Debug, Deserialize)]
struct CreateRequestBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePlanBody {
    design_doc: Option<String>,
    tasks: Option<Vec<TaskBody>>,
}

#[derive(Debug, Deserialize)]
struct TaskBody {
    #[serde(default)]
    title: String,
    #[serde(default, alias = "description")]
    detail: String,
}

impl CreatePlanBody {
    fn into_blueprint(self) -> Result<PlanBlueprint, ValidationError> {
        let mut blueprint = PlanBlueprint::stub();
        if let Some(design_doc) = self.design_doc {
            blueprint = blueprint.with_design_doc(design_doc);
        }
        if let Some(tasks) = self.tasks {
            let definitions = tasks
                .into_iter()
                .map(|task| TaskDefinition::new(task.title, task.detail))
                .collect::<Result<Vec<_>, _>>()?;
            blueprint = blueprint.with_tasks(definitions);
        }
        Ok(blueprint)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanAccepted {
    plan_id: u64,
    estimated_tasks: usize,
}

async fn create_request(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequestBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Request>)> {
    let Json(body) = payload?;
    let request = state
        .pipeline()
        .create_request(NewRequest::new(body.title).with_description(body.description))
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn list_requests(State(state): State<AppState>) -> ApiResult<Json<Vec<Request>>> {
    Ok(Json(state.pipeline().list_requests().await?))
}

async fn get_request(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Request>> {
    let Path(id) = path?;
    Ok(Json(state.pipeline().get_request(RequestId::new(id)).await?))
}

/// Attaches a plan. The body is optional; an empty body yields the stub
/// plan.
async fn create_plan(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PlanAccepted>)> {
    let Path(id) = path?;
    let blueprint = optional_json::<CreatePlanBody>(&body)?.into_blueprint()?;

    let plan = state
        .pipeline()
        .attach_plan(RequestId::new(id), blueprint)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PlanAccepted {
            plan_id: plan.id().value(),
            estimated_tasks: plan.tasks().len(),
        }),
    ))
}
