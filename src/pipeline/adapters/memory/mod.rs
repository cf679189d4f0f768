//! In-memory adapters for pipeline ports.

mod store;

pub use store::InMemoryPipelineStore;
