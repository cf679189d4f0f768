//! Sequential identifier types for pipeline entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity kinds that receive identifiers from an
/// [`IdentityAllocator`](super::IdentityAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// User-submitted request.
    Request,
    /// Plan attached to a request.
    Plan,
    /// Task owned by a plan.
    Task,
    /// Recorded assignment of a plan's tasks.
    Orchestration,
}

impl EntityKind {
    /// Every entity kind, in pipeline order.
    pub const ALL: [Self; 4] = [Self::Request, Self::Plan, Self::Task, Self::Orchestration];

    /// Returns the canonical lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Plan => "plan",
            Self::Task => "task",
            Self::Orchestration => "orchestration",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps an allocated identifier value.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying identifier value.
            #[must_use]
            pub const fn value(self) -> u64 {
                self.0
            }

            /// Returns the entity kind this identifier belongs to.
            #[must_use]
            pub const fn kind() -> EntityKind {
                $kind
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a user-submitted request.
    RequestId => EntityKind::Request
);
entity_id!(
    /// Identifier of a plan.
    PlanId => EntityKind::Plan
);
entity_id!(
    /// Identifier of a task.
    TaskId => EntityKind::Task
);
entity_id!(
    /// Identifier of an orchestration snapshot.
    OrchestrationId => EntityKind::Orchestration
);

/// Reference to a single stored entity of any kind.
///
/// Used by lookups and error values that need to name the missing or
/// conflicting record without caring about its kind statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A request reference.
    Request(RequestId),
    /// A plan reference.
    Plan(PlanId),
    /// A task reference.
    Task(TaskId),
    /// An orchestration reference.
    Orchestration(OrchestrationId),
}

impl EntityRef {
    /// Returns the kind of the referenced entity.
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Request(_) => EntityKind::Request,
            Self::Plan(_) => EntityKind::Plan,
            Self::Task(_) => EntityKind::Task,
            Self::Orchestration(_) => EntityKind::Orchestration,
        }
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn value(self) -> u64 {
        match self {
            Self::Request(id) => id.value(),
            Self::Plan(id) => id.value(),
            Self::Task(id) => id.value(),
            Self::Orchestration(id) => id.value(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.value())
    }
}

impl From<RequestId> for EntityRef {
    fn from(id: RequestId) -> Self {
        Self::Request(id)
    }
}

impl From<PlanId> for EntityRef {
    fn from(id: PlanId) -> Self {
        Self::Plan(id)
    }
}

impl From<TaskId> for EntityRef {
    fn from(id: TaskId) -> Self {
        Self::Task(id)
    }
}

impl From<OrchestrationId> for EntityRef {
    fn from(id: OrchestrationId) -> Self {
        Self::Orchestration(id)
    }
}
