//! Request aggregate and request lifecycle state.

use super::{ConflictError, ParseRequestStateError, RequestId, ValidationError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Request has been submitted and has no plan.
    Created,
    /// At least one plan has been attached.
    Planned,
    /// A plan of the request is being worked by agents.
    Orchestrating,
    /// Every task of every plan has been completed.
    Completed,
}

impl RequestState {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Planned => "planned",
            Self::Orchestrating => "orchestrating",
            Self::Completed => "completed",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Planned => 1,
            Self::Orchestrating => 2,
            Self::Completed => 3,
        }
    }

    /// Returns whether moving to `target` goes strictly forward.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        target.rank() > self.rank()
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RequestState {
    type Error = ParseRequestStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "created" => Ok(Self::Created),
            "planned" => Ok(Self::Planned),
            "orchestrating" => Ok(Self::Orchestrating),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseRequestStateError(value.to_owned())),
        }
    }
}

/// Validated title and description of a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDetails {
    title: String,
    description: String,
}

impl RequestDetails {
    /// Creates request details.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRequestTitle`] when the title is empty
    /// after trimming.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyRequestTitle);
        }

        Ok(Self {
            title: trimmed.to_owned(),
            description: description.into(),
        })
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// User-submitted unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    id: RequestId,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
    state: RequestState,
}

impl Request {
    /// Creates a request in [`RequestState::Created`].
    #[must_use]
    pub fn new(id: RequestId, details: RequestDetails, clock: &impl Clock) -> Self {
        Self {
            id,
            title: details.title,
            description: details.description,
            created_at: clock.utc(),
            state: RequestState::Created,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RequestState {
        self.state
    }

    /// Records that a plan was attached.
    ///
    /// Moves `created` to `planned`; a no-op for `planned` and
    /// `orchestrating`. Returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidRequestTransition`] when the request
    /// is already completed.
    pub fn record_plan_attached(&mut self) -> Result<bool, ConflictError> {
        match self.state {
            RequestState::Created => self.transition_to(RequestState::Planned),
            RequestState::Planned | RequestState::Orchestrating => Ok(false),
            RequestState::Completed => Err(self.transition_conflict(RequestState::Planned)),
        }
    }

    /// Records that an orchestration started for one of the request's plans.
    ///
    /// Returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidRequestTransition`] when the request
    /// is completed or has no plan yet.
    pub fn record_orchestration_started(&mut self) -> Result<bool, ConflictError> {
        match self.state {
            RequestState::Orchestrating => Ok(false),
            RequestState::Planned => self.transition_to(RequestState::Orchestrating),
            RequestState::Created | RequestState::Completed => {
                Err(self.transition_conflict(RequestState::Orchestrating))
            }
        }
    }

    /// Records that every task of every plan has completed.
    ///
    /// Returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidRequestTransition`] when the request
    /// has no plan yet.
    pub fn record_completion(&mut self) -> Result<bool, ConflictError> {
        if self.state == RequestState::Completed {
            return Ok(false);
        }
        if self.state == RequestState::Created {
            return Err(self.transition_conflict(RequestState::Completed));
        }
        self.transition_to(RequestState::Completed)
    }

    fn transition_to(&mut self, target: RequestState) -> Result<bool, ConflictError> {
        if !self.state.can_transition_to(target) {
            return Err(self.transition_conflict(target));
        }
        self.state = target;
        Ok(true)
    }

    const fn transition_conflict(&self, target: RequestState) -> ConflictError {
        ConflictError::InvalidRequestTransition {
            request_id: self.id,
            from: self.state,
            to: target,
        }
    }
}
