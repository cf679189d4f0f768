//! Request, plan, task and orchestration pipeline.
//!
//! Requests are broken into plans, plans into tasks, and tasks are handed to
//! worker agents that report back until every task is completed. The module
//! follows hexagonal architecture:
//!
//! - Domain types, state machines and assignment policies in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Application services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
