//! When steps for pipeline flow BDD scenarios.

use super::world::{PipelineWorld, run_async};
use refactory::pipeline::{
    domain::{AgentSelection, TaskId},
    services::{OrchestratePlanRequest, ReportStatusRequest},
};
use rstest_bdd_macros::when;

fn submit_report(world: &mut PipelineWorld, report: ReportStatusRequest) {
    if let Err(err) = run_async(world.service.report_status(report)) {
        world.last_error = Some(err);
    }
}

#[when(r#"agent "{agent}" reports task {task_id:u64} as "{status}""#)]
fn agent_reports(world: &mut PipelineWorld, agent: String, task_id: u64, status: String) {
    let report = ReportStatusRequest::new(TaskId::new(task_id), status).with_reporter(agent);
    submit_report(world, report);
}

#[when(r#"agent "{agent}" completes task {task_id:u64} touching "{changed_path}""#)]
fn agent_completes_touching(
    world: &mut PipelineWorld,
    agent: String,
    task_id: u64,
    changed_path: String,
) {
    let report = ReportStatusRequest::new(TaskId::new(task_id), "completed")
        .with_reporter(agent)
        .with_changed_paths([changed_path]);
    submit_report(world, report);
}

#[when("the plan is orchestrated again across {count:usize} agent")]
fn plan_orchestrated_again(world: &mut PipelineWorld, count: usize) -> Result<(), eyre::Report> {
    let plan_id = world.plan()?.id();
    let result = run_async(world.service.orchestrate(OrchestratePlanRequest::new(
        plan_id,
        AgentSelection::Count(count),
    )));
    match result {
        Ok(orchestration) => world.orchestration = Some(orchestration),
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}
