//! Refactory: lifecycle and assignment engine for agent work pipelines.
//!
//! User requests are turned into plans, plans into tasks, and tasks are
//! bound to worker agents that report progress until the work is merged.
//!
//! # Architecture
//!
//! Refactory follows hexagonal architecture principles:
//!
//! - **Domain**: Entities, state machines and assignment policies
//! - **Ports**: Abstract trait interfaces for storage and plan generation
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`pipeline`]: Requests, plans, tasks, orchestrations and their services
//! - [`http`]: JSON API over the pipeline services
//! - [`config`]: Flag and environment configuration for the binaries
//! - [`telemetry`]: Tracing subscriber set-up

pub mod config;
pub mod http;
pub mod pipeline;
pub mod telemetry;
