//! Shared world state for pipeline flow BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use refactory::pipeline::{
    adapters::memory::InMemoryPipelineStore,
    domain::{Orchestration, Plan, Request},
    services::{PipelineError, PipelineService},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestPipelineService = PipelineService<InMemoryPipelineStore, DefaultClock>;

/// Scenario world for pipeline flow behaviour tests.
pub struct PipelineWorld {
    pub service: TestPipelineService,
    pub request: Option<Request>,
    pub plan: Option<Plan>,
    pub orchestration: Option<Orchestration>,
    pub last_error: Option<PipelineError>,
}

impl PipelineWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: PipelineService::new(
                Arc::new(InMemoryPipelineStore::new()),
                Arc::new(DefaultClock),
            ),
            request: None,
            plan: None,
            orchestration: None,
            last_error: None,
        }
    }

    /// Returns the plan created by a previous step.
    pub fn plan(&self) -> eyre::Result<&Plan> {
        self.plan
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing plan in scenario world"))
    }
}

impl Default for PipelineWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PipelineWorld {
    PipelineWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
