//! In-memory store for pipeline entities.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::pipeline::{
    domain::{
        EntityKind, EntityRef, IdentityAllocator, Orchestration, OrchestrationId, Plan, PlanId,
        Request, RequestId, Task, TaskFilter, TaskId,
    },
    ports::{PipelineStore, PipelineStoreError, PipelineStoreResult, StoreChanges},
};

/// Thread-safe in-memory pipeline store.
///
/// All entities live behind one lock so a commit is observed either
/// entirely or not at all. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPipelineStore {
    state: Arc<RwLock<InMemoryPipelineState>>,
    ids: Arc<IdentityAllocator>,
}

#[derive(Debug, Default)]
struct InMemoryPipelineState {
    requests: BTreeMap<RequestId, Request>,
    plans: BTreeMap<PlanId, Plan>,
    task_index: HashMap<TaskId, PlanId>,
    orchestrations: BTreeMap<OrchestrationId, Orchestration>,
}

impl InMemoryPipelineStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PipelineStoreResult<RwLockReadGuard<'_, InMemoryPipelineState>> {
        self.state
            .read()
            .map_err(|err| PipelineStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> PipelineStoreResult<RwLockWriteGuard<'_, InMemoryPipelineState>> {
        self.state
            .write()
            .map_err(|err| PipelineStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryPipelineState {
    fn find_task(&self, id: TaskId) -> Option<&Task> {
        let plan_id = self.task_index.get(&id)?;
        self.plans.get(plan_id)?.task(id)
    }

    /// Checks every reference in `changes` against the stored state and the
    /// change set itself.
    fn validate(&self, changes: &StoreChanges) -> PipelineStoreResult<()> {
        let request_known = |id: RequestId| {
            self.requests.contains_key(&id)
                || changes.requests().iter().any(|request| request.id() == id)
        };
        let plan_for = |id: PlanId| {
            changes
                .plans()
                .iter()
                .find(|plan| plan.id() == id)
                .or_else(|| self.plans.get(&id))
        };

        if let Some(plan) = changes
            .plans()
            .iter()
            .find(|plan| !request_known(plan.request_id()))
        {
            return Err(PipelineStoreError::NotFound(EntityRef::Request(
                plan.request_id(),
            )));
        }

        for task in changes.tasks() {
            let plan = plan_for(task.plan_id())
                .ok_or(PipelineStoreError::NotFound(EntityRef::Plan(task.plan_id())))?;
            if plan.task(task.id()).is_none() {
                return Err(PipelineStoreError::NotFound(EntityRef::Task(task.id())));
            }
        }

        if let Some(orchestration) = changes
            .orchestrations()
            .iter()
            .find(|orchestration| plan_for(orchestration.plan_id()).is_none())
        {
            return Err(PipelineStoreError::NotFound(EntityRef::Plan(
                orchestration.plan_id(),
            )));
        }

        Ok(())
    }

    fn apply(&mut self, changes: StoreChanges) {
        let (requests, plans, tasks, orchestrations) = changes.into_parts();

        for request in requests {
            self.requests.insert(request.id(), request);
        }

        for plan in plans {
            for task in plan.tasks() {
                self.task_index.insert(task.id(), plan.id());
            }
            self.plans.insert(plan.id(), plan);
        }

        for task in tasks {
            if let Some(plan) = self.plans.get_mut(&task.plan_id()) {
                plan.replace_task(task);
            }
        }

        for orchestration in orchestrations {
            self.orchestrations.insert(orchestration.id(), orchestration);
        }
    }
}

#[async_trait]
impl PipelineStore for InMemoryPipelineStore {
    fn next_id(&self, kind: EntityKind) -> u64 {
        self.ids.next(kind)
    }

    async fn commit(&self, changes: StoreChanges) -> PipelineStoreResult<()> {
        let mut state = self.write()?;
        state.validate(&changes)?;
        state.apply(changes);
        Ok(())
    }

    async fn find_request(&self, id: RequestId) -> PipelineStoreResult<Option<Request>> {
        Ok(self.read()?.requests.get(&id).cloned())
    }

    async fn list_requests(&self) -> PipelineStoreResult<Vec<Request>> {
        Ok(self.read()?.requests.values().cloned().collect())
    }

    async fn find_plan(&self, id: PlanId) -> PipelineStoreResult<Option<Plan>> {
        Ok(self.read()?.plans.get(&id).cloned())
    }

    async fn list_plans(&self) -> PipelineStoreResult<Vec<Plan>> {
        Ok(self.read()?.plans.values().cloned().collect())
    }

    async fn plans_for_request(&self, request_id: RequestId) -> PipelineStoreResult<Vec<Plan>> {
        Ok(self
            .read()?
            .plans
            .values()
            .filter(|plan| plan.request_id() == request_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: TaskId) -> PipelineStoreResult<Option<Task>> {
        Ok(self.read()?.find_task(id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> PipelineStoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .plans
            .values()
            .filter(|plan| filter.plan_id().is_none_or(|plan_id| plan.id() == plan_id))
            .flat_map(Plan::tasks)
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by_key(Task::id);
        Ok(tasks)
    }

    async fn find_orchestration(
        &self,
        id: OrchestrationId,
    ) -> PipelineStoreResult<Option<Orchestration>> {
        Ok(self.read()?.orchestrations.get(&id).cloned())
    }

    async fn orchestrations_for_plan(
        &self,
        plan_id: PlanId,
    ) -> PipelineStoreResult<Vec<Orchestration>> {
        Ok(self
            .read()?
            .orchestrations
            .values()
            .filter(|orchestration| orchestration.plan_id() == plan_id)
            .cloned()
            .collect())
    }
}
