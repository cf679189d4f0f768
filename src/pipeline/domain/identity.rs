//! Per-kind sequence generator for entity identifiers.

use super::EntityKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues strictly increasing identifiers per [`EntityKind`].
///
/// Each kind starts at `1` and never hands out the same value twice for the
/// lifetime of the allocator. Values are not persisted; a new allocator starts
/// again from `1`.
///
/// # Examples
///
///     use refactory::pipeline::domain::{EntityKind, IdentityAllocator};
///
///     let ids = IdentityAllocator::new();
///     assert_eq!(ids.next(EntityKind::Task), 1);
///     assert_eq!(ids.next(EntityKind::Task), 2);
///     assert_eq!(ids.next(EntityKind::Plan), 1);
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    requests: AtomicU64,
    plans: AtomicU64,
    tasks: AtomicU64,
    orchestrations: AtomicU64,
}

impl IdentityAllocator {
    /// Creates an allocator with every counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next identifier for `kind`.
    pub fn next(&self, kind: EntityKind) -> u64 {
        self.counter(kind)
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1)
    }

    const fn counter(&self, kind: EntityKind) -> &AtomicU64 {
        match kind {
            EntityKind::Request => &self.requests,
            EntityKind::Plan => &self.plans,
            EntityKind::Task => &self.tasks,
            EntityKind::Orchestration => &self.orchestrations,
        }
    }
}
