//! Command-line client for the pipeline service.
//!
//! Usage:
//!
//! ```text
//! refactory request:create -t "Add search" -d "Full-text search over notes"
//! refactory plan:create 1
//! refactory orchestrate 1 -a 2
//! refactory task:report 1 -s completed --pr-url https://example.com/pr/1
//! ```
//!
//! Responses are printed as pretty JSON on stdout.

use clap::{Parser, Subcommand};
use eyre::{WrapErr, bail};
use refactory::config::ClientConfig;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use std::io::Write;

#[derive(Debug, Parser)]
#[command(name = "refactory", version, about = "Pipeline service client")]
struct Cli {
    #[command(flatten)]
    client: ClientConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a request.
    #[command(name = "request:create")]
    RequestCreate {
        /// Request title.
        #[arg(short, long)]
        title: String,
        /// Request description.
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List requests.
    #[command(name = "request:list")]
    RequestList,
    /// Attach the stub plan to a request.
    #[command(name = "plan:create")]
    PlanCreate {
        /// Request identifier.
        request_id: u64,
    },
    /// Show a plan and its tasks.
    #[command(name = "plan:status")]
    PlanStatus {
        /// Plan identifier.
        plan_id: u64,
    },
    /// Assign every task of a plan across numbered agents.
    Orchestrate {
        /// Plan identifier.
        plan_id: u64,
        /// Number of agents.
        #[arg(short, long, default_value_t = 1)]
        agents: usize,
        /// Branch agents should target.
        #[arg(short, long)]
        target_branch: Option<String>,
        /// Record the orchestration as a dry run.
        #[arg(long)]
        dry_run: bool,
        /// Replace an active orchestration.
        #[arg(long)]
        replace: bool,
    },
    /// List tasks of a plan.
    #[command(name = "tasks:list")]
    TasksList {
        /// Plan identifier.
        #[arg(short, long)]
        plan: u64,
        /// Only tasks in this state.
        #[arg(short, long)]
        state: Option<String>,
        /// Only tasks bound to this agent.
        #[arg(long)]
        agent: Option<String>,
    },
    /// Show one task.
    #[command(name = "task:inspect")]
    TaskInspect {
        /// Task identifier.
        task_id: u64,
    },
    /// Report task status as the configured agent.
    #[command(name = "task:report")]
    TaskReport {
        /// Task identifier.
        task_id: u64,
        /// New status.
        #[arg(short, long)]
        status: String,
        /// Pull request URL.
        #[arg(long)]
        pr_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _dotenv = dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let http = Client::new();
    let response = dispatch(&http, &cli.client, cli.command).await?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &response)?;
    writeln!(stdout)?;
    Ok(())
}

async fn dispatch(http: &Client, client: &ClientConfig, command: Command) -> eyre::Result<Value> {
    let request = match command {
        Command::RequestCreate { title, description } => http
            .post(client.endpoint("/requests"))
            .json(&json!({ "title": title, "description": description })),
        Command::RequestList => http.get(client.endpoint("/requests")),
        Command::PlanCreate { request_id } => {
            http.post(client.endpoint(&format!("/requests/{request_id}/plans")))
        }
        Command::PlanStatus { plan_id } => http.get(client.endpoint(&format!("/plans/{plan_id}"))),
        Command::Orchestrate {
            plan_id,
            agents,
            target_branch,
            dry_run,
            replace,
        } => http
            .post(client.endpoint(&format!("/plans/{plan_id}/orchestrate")))
            .json(&json!({
                "agents": agents,
                "targetBranch": target_branch,
                "dryRun": dry_run,
                "replace": replace,
            })),
        Command::TasksList { plan, state, agent } => {
            let mut query = vec![("planId", plan.to_string())];
            query.extend(state.map(|value| ("state", value)));
            query.extend(agent.map(|value| ("agent", value)));
            http.get(client.endpoint("/tasks")).query(&query)
        }
        Command::TaskInspect { task_id } => http.get(client.endpoint(&format!("/tasks/{task_id}"))),
        Command::TaskReport {
            task_id,
            status,
            pr_url,
        } => http
            .post(client.endpoint(&format!("/agents/{}/prs", client.agent)))
            .json(&json!({ "task_id": task_id, "status": status, "pr_url": pr_url })),
    };
    send(request).await
}

async fn send(request: RequestBuilder) -> eyre::Result<Value> {
    let response = request.send().await.wrap_err("request to service failed")?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .wrap_err("service returned a non-JSON body")?;

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        bail!("{status}: {message}");
    }
    Ok(body)
}
