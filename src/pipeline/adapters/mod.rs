//! Adapter implementations for pipeline ports.

pub mod memory;
mod static_planner;

pub use static_planner::StaticPlanGenerator;
