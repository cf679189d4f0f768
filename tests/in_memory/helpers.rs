//! Shared test helpers for in-memory store integration tests.

use mockable::DefaultClock;
use refactory::pipeline::{
    adapters::memory::InMemoryPipelineStore,
    domain::{
        EntityKind, Plan, PlanId, Request, RequestDetails, RequestId, TaskDefinition, TaskId,
    },
    ports::PipelineStore,
    services::PipelineService,
};
use rstest::fixture;
use std::sync::Arc;

/// Pipeline service over the in-memory store.
pub type TestService = PipelineService<InMemoryPipelineStore, DefaultClock>;

/// Provides a fresh in-memory store for each test.
#[fixture]
pub fn store() -> InMemoryPipelineStore {
    InMemoryPipelineStore::new()
}

/// Provides a pipeline service over a fresh store.
#[fixture]
pub fn service() -> TestService {
    PipelineService::new(
        Arc::new(InMemoryPipelineStore::new()),
        Arc::new(DefaultClock),
    )
}

/// Builds a request with identifiers drawn from `store`.
///
/// # Errors
///
/// Returns an error if the title is rejected.
pub fn new_request(store: &InMemoryPipelineStore, title: &str) -> eyre::Result<Request> {
    let id = RequestId::new(store.next_id(EntityKind::Request));
    Ok(Request::new(
        id,
        RequestDetails::new(title, "")?,
        &DefaultClock,
    ))
}

/// Builds a plan with `task_count` tasks for `request_id`.
///
/// # Errors
///
/// Returns an error if a task definition is rejected.
pub fn new_plan(
    store: &InMemoryPipelineStore,
    request_id: RequestId,
    task_count: usize,
) -> eyre::Result<Plan> {
    let plan_id = PlanId::new(store.next_id(EntityKind::Plan));
    let tasks = (1..=task_count)
        .map(|n| -> eyre::Result<(TaskId, TaskDefinition)> {
            let definition = TaskDefinition::new(format!("Task {n}"), "")?;
            Ok((TaskId::new(store.next_id(EntityKind::Task)), definition))
        })
        .collect::<eyre::Result<Vec<_>>>()?;
    Ok(Plan::new(
        plan_id,
        request_id,
        "design".to_owned(),
        tasks,
        &DefaultClock,
    ))
}
