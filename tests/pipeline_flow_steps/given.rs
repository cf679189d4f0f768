//! Given steps for pipeline flow BDD scenarios.

use super::world::{PipelineWorld, run_async};
use eyre::WrapErr;
use refactory::pipeline::{
    domain::{AgentSelection, PlanBlueprint, TaskDefinition},
    services::{NewRequest, OrchestratePlanRequest},
};
use rstest_bdd_macros::given;

#[given(r#"a request titled "{title}""#)]
fn request_titled(world: &mut PipelineWorld, title: String) -> Result<(), eyre::Report> {
    let request = run_async(world.service.create_request(NewRequest::new(title)))
        .wrap_err("create request for pipeline scenario")?;
    world.request = Some(request);
    Ok(())
}

#[given("the request has a plan with {count:usize} tasks")]
fn request_has_plan(world: &mut PipelineWorld, count: usize) -> Result<(), eyre::Report> {
    let request_id = world
        .request
        .as_ref()
        .map(|request| request.id())
        .ok_or_else(|| eyre::eyre!("missing request in scenario world"))?;

    let tasks = (1..=count)
        .map(|n| TaskDefinition::new(format!("Task {n}"), format!("Step {n}")))
        .collect::<Result<Vec<_>, _>>()?;
    let blueprint = PlanBlueprint::stub()
        .with_design_doc("Scenario design")
        .with_tasks(tasks);

    let plan = run_async(world.service.attach_plan(request_id, blueprint))
        .wrap_err("attach plan for pipeline scenario")?;
    world.plan = Some(plan);
    Ok(())
}

#[given("the plan is orchestrated across {count:usize} agents")]
fn plan_orchestrated(world: &mut PipelineWorld, count: usize) -> Result<(), eyre::Report> {
    let plan_id = world.plan()?.id();
    let orchestration = run_async(world.service.orchestrate(OrchestratePlanRequest::new(
        plan_id,
        AgentSelection::Count(count),
    )))
    .wrap_err("orchestrate plan for pipeline scenario")?;
    world.orchestration = Some(orchestration);
    Ok(())
}
