//! Then steps for pipeline flow BDD scenarios.

use super::world::{PipelineWorld, run_async};
use refactory::pipeline::{
    domain::{OrchestrationState, RequestState, TaskId, TaskState},
    services::{ErrorKind, PipelineError},
};
use rstest_bdd_macros::then;

fn expect_error_kind(world: &PipelineWorld, expected: ErrorKind) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected a rejection, but every step succeeded"))?;
    if err.kind() != expected {
        return Err(eyre::eyre!("expected {expected:?} rejection, got {err:?}"));
    }
    Ok(())
}

#[then(r#"the orchestration state is "{state}""#)]
fn orchestration_state_is(world: &PipelineWorld, state: String) -> Result<(), eyre::Report> {
    let expected = OrchestrationState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let id = world
        .orchestration
        .as_ref()
        .map(|orchestration| orchestration.id())
        .ok_or_else(|| eyre::eyre!("missing orchestration in scenario world"))?;

    let stored = run_async(world.service.get_orchestration(id))?;
    if stored.state() != expected {
        return Err(eyre::eyre!(
            "expected orchestration state {expected}, found {}",
            stored.state()
        ));
    }
    Ok(())
}

#[then(r#"the request state is "{state}""#)]
fn request_state_is(world: &PipelineWorld, state: String) -> Result<(), eyre::Report> {
    let expected = RequestState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let id = world
        .request
        .as_ref()
        .map(|request| request.id())
        .ok_or_else(|| eyre::eyre!("missing request in scenario world"))?;

    let stored = run_async(world.service.get_request(id))?;
    if stored.state() != expected {
        return Err(eyre::eyre!(
            "expected request state {expected}, found {}",
            stored.state()
        ));
    }
    Ok(())
}

#[then(r#"task {task_id:u64} is in state "{state}""#)]
fn task_state_is(world: &PipelineWorld, task_id: u64, state: String) -> Result<(), eyre::Report> {
    let expected = TaskState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let task = run_async(world.service.get_task(TaskId::new(task_id)))?;
    if task.state() != expected {
        return Err(eyre::eyre!(
            "expected task state {expected}, found {}",
            task.state()
        ));
    }
    Ok(())
}

#[then("the report is rejected as a conflict")]
fn report_rejected_as_conflict(world: &PipelineWorld) -> Result<(), eyre::Report> {
    expect_error_kind(world, ErrorKind::Conflict)
}

#[then("the report is rejected as a path traversal")]
fn report_rejected_as_traversal(world: &PipelineWorld) -> Result<(), eyre::Report> {
    if !matches!(world.last_error, Some(PipelineError::PathTraversal(_))) {
        return Err(eyre::eyre!(
            "expected path traversal rejection, got {:?}",
            world.last_error
        ));
    }
    Ok(())
}

#[then("the orchestration is rejected as a conflict")]
fn orchestration_rejected_as_conflict(world: &PipelineWorld) -> Result<(), eyre::Report> {
    expect_error_kind(world, ErrorKind::Conflict)
}
