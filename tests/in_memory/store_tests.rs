//! Atomic commit and lookup tests for the in-memory store.

use super::helpers::{new_plan, new_request, store};
use mockable::DefaultClock;
use refactory::pipeline::{
    adapters::memory::InMemoryPipelineStore,
    domain::{
        AgentName, AgentRoster, BranchName, EntityRef, Orchestration, OrchestrationId,
        OrchestrationSnapshot, PlanId, RequestId, TaskFilter, TaskId, TaskState,
    },
    ports::{PipelineStore, PipelineStoreError, StoreChanges},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn request_and_plan_commit_together(store: InMemoryPipelineStore) -> eyre::Result<()> {
    let request = new_request(&store, "T")?;
    let plan = new_plan(&store, request.id(), 2)?;

    store
        .commit(
            StoreChanges::new()
                .with_request(request.clone())
                .with_plan(plan.clone()),
        )
        .await?;

    eyre::ensure!(store.find_request(request.id()).await? == Some(request));
    eyre::ensure!(store.find_plan(plan.id()).await? == Some(plan.clone()));
    let first_task = plan
        .tasks()
        .first()
        .ok_or_else(|| eyre::eyre!("plan has no tasks"))?;
    eyre::ensure!(store.find_task(first_task.id()).await? == Some(first_task.clone()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plan_for_unknown_request_is_rejected_atomically(
    store: InMemoryPipelineStore,
) -> eyre::Result<()> {
    let orphan = new_plan(&store, RequestId::new(99), 1)?;
    let request = new_request(&store, "T")?;

    let result = store
        .commit(StoreChanges::new().with_request(request).with_plan(orphan))
        .await;

    eyre::ensure!(matches!(
        result,
        Err(PipelineStoreError::NotFound(EntityRef::Request(id))) if id == RequestId::new(99)
    ));
    eyre::ensure!(store.list_requests().await?.is_empty());
    eyre::ensure!(store.list_plans().await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_update_replaces_stored_copy(store: InMemoryPipelineStore) -> eyre::Result<()> {
    let request = new_request(&store, "T")?;
    let plan = new_plan(&store, request.id(), 2)?;
    store
        .commit(StoreChanges::new().with_request(request).with_plan(plan.clone()))
        .await?;

    let mut task = plan
        .tasks()
        .last()
        .cloned()
        .ok_or_else(|| eyre::eyre!("plan has no tasks"))?;
    task.assign_to(AgentName::new("c1")?)?;
    store.commit(StoreChanges::new().with_task(task.clone())).await?;

    let stored_plan = store
        .find_plan(plan.id())
        .await?
        .ok_or_else(|| eyre::eyre!("plan missing"))?;
    eyre::ensure!(stored_plan.task(task.id()) == Some(&task));
    let assigned = store
        .list_tasks(&TaskFilter::new().in_state(TaskState::Assigned))
        .await?;
    eyre::ensure!(assigned == vec![task]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_from_unknown_plan_is_rejected(store: InMemoryPipelineStore) -> eyre::Result<()> {
    let detached = new_plan(&store, RequestId::new(1), 1)?;
    let task = detached
        .tasks()
        .first()
        .cloned()
        .ok_or_else(|| eyre::eyre!("plan has no tasks"))?;

    let result = store.commit(StoreChanges::new().with_task(task)).await;

    eyre::ensure!(matches!(
        result,
        Err(PipelineStoreError::NotFound(EntityRef::Plan(id))) if id == detached.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn orchestration_for_unknown_plan_is_rejected(store: InMemoryPipelineStore) -> eyre::Result<()> {
    let orchestration = Orchestration::new(
        OrchestrationId::new(1),
        PlanId::new(5),
        OrchestrationSnapshot {
            agents: AgentRoster::numbered(1)?,
            target_branch: BranchName::default(),
            dry_run: false,
            tasks: Vec::new(),
        },
        &DefaultClock,
    );

    let result = store
        .commit(StoreChanges::new().with_orchestration(orchestration))
        .await;

    eyre::ensure!(matches!(
        result,
        Err(PipelineStoreError::NotFound(EntityRef::Plan(_)))
    ));
    eyre::ensure!(store.find_orchestration(OrchestrationId::new(1)).await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_follow_identifier_order(store: InMemoryPipelineStore) -> eyre::Result<()> {
    let first = new_request(&store, "First")?;
    let second = new_request(&store, "Second")?;
    let early_plan = new_plan(&store, second.id(), 1)?;
    let late_plan = new_plan(&store, first.id(), 2)?;

    store
        .commit(
            StoreChanges::new()
                .with_request(second.clone())
                .with_request(first.clone())
                .with_plan(late_plan.clone())
                .with_plan(early_plan.clone()),
        )
        .await?;

    let request_ids: Vec<RequestId> = store
        .list_requests()
        .await?
        .iter()
        .map(|request| request.id())
        .collect();
    eyre::ensure!(request_ids == [first.id(), second.id()]);

    let task_ids: Vec<TaskId> = store
        .list_tasks(&TaskFilter::new())
        .await?
        .iter()
        .map(|task| task.id())
        .collect();
    eyre::ensure!(task_ids == [TaskId::new(1), TaskId::new(2), TaskId::new(3)]);

    let for_first = store.plans_for_request(first.id()).await?;
    eyre::ensure!(for_first == vec![late_plan]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_filter_matches_nothing_in_empty_store(store: InMemoryPipelineStore) -> eyre::Result<()> {
    let tasks = store
        .list_tasks(&TaskFilter::new().for_plan(PlanId::new(1)))
        .await?;
    eyre::ensure!(tasks.is_empty());
    eyre::ensure!(store.find_task(TaskId::new(1)).await?.is_none());
    Ok(())
}

#[rstest]
fn change_set_reports_emptiness(store: InMemoryPipelineStore) -> eyre::Result<()> {
    let request = new_request(&store, "T")?;

    eyre::ensure!(StoreChanges::new().is_empty());
    eyre::ensure!(!StoreChanges::new().with_request(request).is_empty());
    Ok(())
}
