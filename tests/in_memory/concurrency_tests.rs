//! Concurrent callers against one pipeline service.

use super::helpers::{TestService, service};
use refactory::pipeline::{
    domain::{AgentSelection, ConflictError, PlanBlueprint, TaskFilter, TaskId, TaskState},
    services::{NewRequest, OrchestratePlanRequest, PipelineError, ReportStatusRequest},
};
use rstest::rstest;
use std::collections::{HashMap, HashSet};
use tokio::task::JoinSet;

const CALLERS: u64 = 32;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_receive_unique_sequential_ids(
    service: TestService,
) -> eyre::Result<()> {
    let mut callers = JoinSet::new();
    for n in 0..CALLERS {
        let caller = service.clone();
        callers.spawn(async move { caller.create_request(NewRequest::new(format!("R{n}"))).await });
    }

    let mut ids = HashSet::new();
    while let Some(joined) = callers.join_next().await {
        ids.insert(joined??.id().value());
    }

    let expected: HashSet<u64> = (1..=CALLERS).collect();
    eyre::ensure!(ids == expected);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_concurrent_orchestration_wins(service: TestService) -> eyre::Result<()> {
    let request = service.create_request(NewRequest::new("T")).await?;
    let plan = service
        .attach_plan(request.id(), PlanBlueprint::stub())
        .await?;

    let mut callers = JoinSet::new();
    for count in 1..=8 {
        let caller = service.clone();
        let payload = OrchestratePlanRequest::new(plan.id(), AgentSelection::Count(count));
        callers.spawn(async move { caller.orchestrate(payload).await });
    }

    let mut accepted = 0_usize;
    let mut rejected = 0_usize;
    while let Some(joined) = callers.join_next().await {
        match joined? {
            Ok(_) => accepted += 1,
            Err(PipelineError::Conflict(ConflictError::ActiveOrchestration { .. })) => {
                rejected += 1;
            }
            Err(other) => return Err(other.into()),
        }
    }

    eyre::ensure!(accepted == 1);
    eyre::ensure!(rejected == 7);
    eyre::ensure!(service.orchestrations_for_plan(plan.id()).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_reports_converge(service: TestService) -> eyre::Result<()> {
    let request = service.create_request(NewRequest::new("T")).await?;
    let plan = service
        .attach_plan(request.id(), PlanBlueprint::stub())
        .await?;
    service
        .orchestrate(OrchestratePlanRequest::new(plan.id(), AgentSelection::Count(1)))
        .await?;

    let mut callers = JoinSet::new();
    for _ in 0..CALLERS {
        let caller = service.clone();
        let report = ReportStatusRequest::new(TaskId::new(1), "completed")
            .with_reporter("coder1")
            .with_pr_url("https://example.com/pr/1");
        callers.spawn(async move { caller.report_status(report).await });
    }

    while let Some(joined) = callers.join_next().await {
        let task = joined??;
        eyre::ensure!(task.state() == TaskState::Completed);
    }

    let stored = service.get_task(TaskId::new(1)).await?;
    eyre::ensure!(stored.pr_url().map(|url| url.as_str()) == Some("https://example.com/pr/1"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_polls_never_double_book_an_agent(service: TestService) -> eyre::Result<()> {
    for n in 0..4 {
        let request = service
            .create_request(NewRequest::new(format!("R{n}")))
            .await?;
        service
            .attach_plan(request.id(), PlanBlueprint::stub())
            .await?;
    }

    let mut callers = JoinSet::new();
    for _ in 0..8 {
        let caller = service.clone();
        callers.spawn(async move { caller.poll_backlog(AgentSelection::Count(3)).await });
    }
    while let Some(joined) = callers.join_next().await {
        joined??;
    }

    let assigned = service
        .list_tasks(&TaskFilter::new().in_state(TaskState::Assigned))
        .await?;
    let mut per_agent: HashMap<String, usize> = HashMap::new();
    for task in &assigned {
        let agent = task
            .agent()
            .ok_or_else(|| eyre::eyre!("assigned task {} has no agent", task.id()))?;
        *per_agent.entry(agent.as_str().to_owned()).or_default() += 1;
    }

    eyre::ensure!(assigned.len() == 3);
    eyre::ensure!(per_agent.values().all(|count| *count == 1));
    Ok(())
}
