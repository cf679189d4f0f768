//! Deterministic offline plan generator.

use async_trait::async_trait;
use serde_json::json;

use crate::pipeline::{
    domain::{RequestDetails, STUB_TASKS},
    ports::{PlanGenerator, PlanGeneratorResult},
};

/// Plan generator that answers every request with the stub plan.
///
/// The design document is headed by the request title and repeats its
/// description; the ticket list is the three stub tasks encoded as generator
/// output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPlanGenerator;

impl StaticPlanGenerator {
    /// Creates the generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlanGenerator for StaticPlanGenerator {
    async fn design(&self, request: &RequestDetails) -> PlanGeneratorResult<String> {
        Ok(format!(
            "# Design: {}\n\n{}",
            request.title(),
            request.description()
        ))
    }

    async fn tickets(&self, _design_doc: &str) -> PlanGeneratorResult<String> {
        let tickets: Vec<_> = STUB_TASKS
            .iter()
            .map(|(title, detail)| json!({ "title": title, "detail": detail }))
            .collect();
        Ok(serde_json::Value::Array(tickets).to_string())
    }
}
