//! Command-line and environment configuration.
//!
//! Every setting can be given as a flag or an environment variable. The
//! binaries load a `.env` file first, so values there behave like exported
//! variables.

use crate::pipeline::domain::{AgentRoster, ValidationError};
use clap::{Args, Parser, ValueEnum};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Plan generator backing the workflow endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlannerKind {
    /// Deterministic offline generator.
    Static,
    /// No generator; the workflow endpoint answers 503.
    Disabled,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Settings for the `refactory-server` binary.
#[derive(Clone, Parser)]
#[command(name = "refactory-server", version, about = "Request pipeline service")]
pub struct ServiceConfig {
    /// Address to listen on.
    #[arg(long, env = "REFACTORY_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Default agents for the workflow and backlog endpoints.
    #[arg(
        long,
        env = "REFACTORY_AGENTS",
        value_delimiter = ',',
        default_value = "coder1,coder2"
    )]
    pub agents: Vec<String>,

    /// Plan generator to use.
    #[arg(long, env = "REFACTORY_PLANNER", value_enum, default_value_t = PlannerKind::Static)]
    pub planner: PlannerKind,

    /// Bound on each generator call, in seconds.
    #[arg(long, env = "REFACTORY_PLANNER_TIMEOUT_SECS", default_value_t = 60)]
    pub planner_timeout_secs: u64,

    /// Log output format.
    #[arg(long, env = "REFACTORY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Credential for a hosted generator.
    #[arg(long, env = "OPENAI_API_KEY", hide = true, hide_env_values = true)]
    pub openai_api_key: Option<String>,
}

impl ServiceConfig {
    /// Builds the default roster from the configured agent names.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a name is invalid, duplicated, or
    /// the list is empty.
    pub fn default_roster(&self) -> Result<AgentRoster, ValidationError> {
        AgentRoster::from_names(self.agents.iter().map(String::as_str))
    }

    /// Returns the generator timeout.
    #[must_use]
    pub const fn planner_timeout(&self) -> Duration {
        Duration::from_secs(self.planner_timeout_secs)
    }

    /// Reports whether a generator credential is present.
    #[must_use]
    pub const fn has_generator_credential(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("bind", &self.bind)
            .field("agents", &self.agents)
            .field("planner", &self.planner)
            .field("planner_timeout_secs", &self.planner_timeout_secs)
            .field("log_format", &self.log_format)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Connection settings for the command-line client.
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Base URL of the pipeline service.
    #[arg(long, global = true, env = "REF_API_URL", default_value = "http://localhost:3000")]
    pub api_url: String,

    /// Agent name used when reporting status.
    #[arg(long, env = "AGENT_NAME", default_value = "coder1")]
    pub agent: String,
}

impl ClientConfig {
    /// Joins `path` onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, LogFormat, PlannerKind, ServiceConfig};
    use clap::Parser;
    use rstest::rstest;
    use std::time::Duration;

    #[test]
    fn service_config_parses_flags() {
        let config = ServiceConfig::try_parse_from([
            "refactory-server",
            "--bind",
            "0.0.0.0:8080",
            "--agents",
            "alpha,beta,gamma",
            "--planner",
            "disabled",
            "--planner-timeout-secs",
            "5",
            "--log-format",
            "json",
        ])
        .expect("flags should parse");

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.agents, vec!["alpha", "beta", "gamma"]);
        assert_eq!(config.planner, PlannerKind::Disabled);
        assert_eq!(config.planner_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn default_roster_rejects_duplicates() {
        let config =
            ServiceConfig::try_parse_from(["refactory-server", "--agents", "coder1,coder1"])
                .expect("flags should parse");

        assert!(config.default_roster().is_err());
    }

    #[test]
    fn debug_output_redacts_credential() {
        let config = ServiceConfig::try_parse_from([
            "refactory-server",
            "--openai-api-key",
            "sk-secret",
        ])
        .expect("flags should parse");

        let rendered = format!("{config:?}");
        assert!(config.has_generator_credential());
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    #[case("http://localhost:3000", "/requests", "http://localhost:3000/requests")]
    #[case("http://localhost:3000/", "requests/1", "http://localhost:3000/requests/1")]
    #[case("http://host/", "/tasks?planId=1", "http://host/tasks?planId=1")]
    fn client_endpoint_joins_paths(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let config = ClientConfig {
            api_url: base.to_owned(),
            agent: "coder1".to_owned(),
        };
        assert_eq!(config.endpoint(path), expected);
    }
}
