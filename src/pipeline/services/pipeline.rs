//! Pipeline service: request intake and plan attachment.

use super::{PipelineError, PipelineResult};
use crate::pipeline::{
    domain::{
        EntityKind, EntityRef, Orchestration, OrchestrationId, Plan, PlanBlueprint, PlanId,
        Request, RequestDetails, RequestId, Task, TaskDefinition, TaskId, ValidationError,
    },
    ports::{PipelineStore, StoreChanges},
};
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

/// Payload for submitting a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    title: String,
    description: String,
}

impl NewRequest {
    /// Creates a payload with a title and an empty description.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the raw title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub(super) fn into_details(self) -> Result<RequestDetails, ValidationError> {
        RequestDetails::new(self.title, self.description)
    }
}

/// Lifecycle and assignment service over a [`PipelineStore`].
///
/// Every read-modify-write sequence runs behind one mutation gate, so two
/// callers never interleave between reading an entity and committing the
/// change derived from it. Reads do not take the gate; the store's atomic
/// commit keeps them consistent.
pub struct PipelineService<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    pub(super) store: Arc<S>,
    pub(super) clock: Arc<C>,
    gate: Arc<Mutex<()>>,
}

impl<S, C> Clone for PipelineService<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<S, C> PipelineService<S, C>
where
    S: PipelineStore,
    C: Clock + Send + Sync,
{
    /// Creates a new pipeline service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Submits a new request.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] when the title is blank, or
    /// [`PipelineError::Store`] when the store fails.
    pub async fn create_request(&self, payload: NewRequest) -> PipelineResult<Request> {
        let details = payload.into_details()?;

        let _guard = self.lock().await;
        let id = RequestId::new(self.store.next_id(EntityKind::Request));
        let request = Request::new(id, details, &*self.clock);
        self.store
            .commit(StoreChanges::new().with_request(request.clone()))
            .await?;

        info!(request_id = %id, title = request.title(), "request created");
        Ok(request)
    }

    /// Attaches a new plan built from `blueprint` to a request.
    ///
    /// A `created` request moves to `planned`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] when the blueprint carries an
    /// empty task list, [`PipelineError::NotFound`] for an unknown request
    /// or [`PipelineError::Conflict`] when the request is already completed.
    pub async fn attach_plan(
        &self,
        request_id: RequestId,
        blueprint: PlanBlueprint,
    ) -> PipelineResult<Plan> {
        blueprint.validate()?;

        let _guard = self.lock().await;
        let mut request = self.require_request(request_id).await?;
        let request_changed = request.record_plan_attached()?;

        let (design_doc, definitions) = blueprint.resolve(request_id);
        let plan = self.new_plan(request_id, design_doc, definitions);

        let mut changes = StoreChanges::new().with_plan(plan.clone());
        if request_changed {
            changes = changes.with_request(request);
        }
        self.store.commit(changes).await?;

        info!(
            request_id = %request_id,
            plan_id = %plan.id(),
            tasks = plan.tasks().len(),
            "plan attached"
        );
        Ok(plan)
    }

    /// Stores a new request together with its first plan in one commit.
    ///
    /// The request is written already `planned`.
    pub(super) async fn create_planned_request(
        &self,
        details: RequestDetails,
        design_doc: String,
        definitions: Vec<TaskDefinition>,
    ) -> PipelineResult<(Request, Plan)> {
        if definitions.is_empty() {
            return Err(ValidationError::NoTaskDefinitions.into());
        }

        let _guard = self.lock().await;
        let id = RequestId::new(self.store.next_id(EntityKind::Request));
        let mut request = Request::new(id, details, &*self.clock);
        request.record_plan_attached()?;
        let plan = self.new_plan(id, design_doc, definitions);

        self.store
            .commit(
                StoreChanges::new()
                    .with_request(request.clone())
                    .with_plan(plan.clone()),
            )
            .await?;

        info!(
            request_id = %id,
            plan_id = %plan.id(),
            tasks = plan.tasks().len(),
            "request created with plan"
        );
        Ok((request, plan))
    }

    /// Allocates identifiers for a plan and its tasks. Callers hold the gate.
    fn new_plan(
        &self,
        request_id: RequestId,
        design_doc: String,
        definitions: Vec<TaskDefinition>,
    ) -> Plan {
        let plan_id = PlanId::new(self.store.next_id(EntityKind::Plan));
        let tasks = definitions
            .into_iter()
            .map(|definition| {
                let task_id = TaskId::new(self.store.next_id(EntityKind::Task));
                (task_id, definition)
            })
            .collect();
        Plan::new(plan_id, request_id, design_doc, tasks, &*self.clock)
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    pub(super) async fn require_request(&self, id: RequestId) -> PipelineResult<Request> {
        self.store
            .find_request(id)
            .await?
            .ok_or(PipelineError::NotFound(EntityRef::Request(id)))
    }

    pub(super) async fn require_plan(&self, id: PlanId) -> PipelineResult<Plan> {
        self.store
            .find_plan(id)
            .await?
            .ok_or(PipelineError::NotFound(EntityRef::Plan(id)))
    }

    pub(super) async fn require_task(&self, id: TaskId) -> PipelineResult<Task> {
        self.store
            .find_task(id)
            .await?
            .ok_or(PipelineError::NotFound(EntityRef::Task(id)))
    }

    pub(super) async fn require_orchestration(
        &self,
        id: OrchestrationId,
    ) -> PipelineResult<Orchestration> {
        self.store
            .find_orchestration(id)
            .await?
            .ok_or(PipelineError::NotFound(EntityRef::Orchestration(id)))
    }
}
