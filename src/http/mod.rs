//! JSON HTTP interface over the pipeline services.
//!
//! Handlers decode the wire payload, call one service operation and encode
//! the result. All failures render as `{"error": "<message>"}`.

mod agents;
mod error;
mod orchestrations;
mod plans;
mod requests;
mod tasks;
mod workflow;

pub use error::{ApiError, ApiResult};

use crate::pipeline::{
    adapters::memory::InMemoryPipelineStore,
    domain::{AgentRoster, AgentSelection},
    services::{PipelineService, PlanningWorkflow},
};
use axum::{Json, Router, body::Bytes, routing::get};
use mockable::DefaultClock;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_http::trace::TraceLayer;

/// Pipeline service type served over HTTP.
pub type Pipeline = PipelineService<InMemoryPipelineStore, DefaultClock>;

/// Planning workflow type served over HTTP.
pub type Workflow = PlanningWorkflow<InMemoryPipelineStore, DefaultClock>;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pipeline: Pipeline,
    workflow: Option<Workflow>,
    default_agents: AgentRoster,
}

impl AppState {
    /// Creates state without a planning workflow.
    ///
    /// `default_agents` is used by the workflow and by backlog endpoints
    /// called without a body.
    #[must_use]
    pub const fn new(pipeline: Pipeline, default_agents: AgentRoster) -> Self {
        Self {
            pipeline,
            workflow: None,
            default_agents,
        }
    }

    /// Enables the planning workflow endpoint.
    #[must_use]
    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflow = Some(workflow);
        self
    }

    /// Returns the pipeline service.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(requests::routes())
        .merge(plans::routes())
        .merge(orchestrations::routes())
        .merge(tasks::routes())
        .merge(agents::routes())
        .merge(workflow::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Decodes a JSON body that may be omitted. An empty or all-whitespace body
/// yields `T::default()`.
fn optional_json<T>(body: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Body accepted by endpoints that take an optional roster.
#[derive(Debug, Default, Deserialize)]
struct AgentsBody {
    agents: Option<AgentSelection>,
}

impl AgentsBody {
    fn or_defaults(self, state: &AppState) -> AgentSelection {
        self.agents
            .unwrap_or_else(|| AgentSelection::from(&state.default_agents))
    }
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}
