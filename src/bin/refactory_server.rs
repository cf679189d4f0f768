//! Serves the pipeline JSON API.
//!
//! Usage:
//!
//! ```text
//! refactory-server [--bind ADDR] [--agents a,b] [--planner static|disabled]
//! ```
//!
//! All state lives in memory and is lost when the process exits.

use clap::Parser;
use eyre::WrapErr;
use mockable::DefaultClock;
use refactory::{
    config::{PlannerKind, ServiceConfig},
    http::{AppState, Pipeline, Workflow, router},
    pipeline::adapters::{StaticPlanGenerator, memory::InMemoryPipelineStore},
    telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _dotenv = dotenvy::dotenv().ok();
    let config = ServiceConfig::parse();
    telemetry::init(config.log_format)?;

    let default_agents = config
        .default_roster()
        .wrap_err("invalid default agent roster")?;
    let pipeline = Pipeline::new(
        Arc::new(InMemoryPipelineStore::new()),
        Arc::new(DefaultClock),
    );

    let mut state = AppState::new(pipeline.clone(), default_agents);
    match config.planner {
        PlannerKind::Static => {
            let workflow = Workflow::new(pipeline, Arc::new(StaticPlanGenerator::new()))
                .with_timeout(config.planner_timeout());
            state = state.with_workflow(workflow);
            info!(
                timeout_secs = config.planner_timeout_secs,
                credential_present = config.has_generator_credential(),
                "static plan generator enabled"
            );
        }
        PlannerKind::Disabled => warn!("plan generator disabled; /workflow will answer 503"),
    }

    warn!("pipeline state is held in memory and will be lost on restart");

    let listener = TcpListener::bind(config.bind)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.bind))?;
    info!(address = %config.bind, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
