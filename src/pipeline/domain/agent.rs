//! Agent identity and roster value objects.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Maximum length for an agent name.
const MAX_NAME_LENGTH: usize = 100;

/// Upper bound on rosters generated from a count.
pub const MAX_NUMBERED_AGENTS: usize = 256;

/// Prefix used for generated agent names (`coder1`, `coder2`, ...).
const NUMBERED_AGENT_PREFIX: &str = "coder";

/// Validated identity of an external worker agent.
///
/// Agent names are trimmed and must consist of ASCII letters, digits, `.`,
/// `-` or `_`. Case is preserved, so `Coder1` and `coder1` are different
/// agents.
///
/// # Examples
///
///     use refactory::pipeline::domain::AgentName;
///
///     let agent = AgentName::new("  coder1 ").expect("valid agent name");
///     assert_eq!(agent.as_str(), "coder1");
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentName(String);

impl AgentName {
    /// Creates a validated agent name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAgentName`] when the value is empty
    /// after trimming, [`ValidationError::AgentNameTooLong`] when it exceeds
    /// 100 characters, or [`ValidationError::InvalidAgentName`] when it
    /// contains characters outside `[A-Za-z0-9_.-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(ValidationError::EmptyAgentName);
        }

        if normalized.len() > MAX_NAME_LENGTH {
            return Err(ValidationError::AgentNameTooLong(raw));
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

        if !is_valid {
            return Err(ValidationError::InvalidAgentName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the agent name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AgentName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, non-empty, duplicate-free list of agents used by one assignment
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentRoster(Vec<AgentName>);

impl AgentRoster {
    /// Creates a roster from already validated names, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAgentRoster`] for an empty list or
    /// [`ValidationError::DuplicateAgent`] when a name repeats.
    pub fn new(agents: Vec<AgentName>) -> Result<Self, ValidationError> {
        if agents.is_empty() {
            return Err(ValidationError::EmptyAgentRoster);
        }

        let mut seen = HashSet::with_capacity(agents.len());
        if let Some(duplicate) = agents.iter().find(|agent| !seen.insert(agent.as_str())) {
            return Err(ValidationError::DuplicateAgent(duplicate.clone()));
        }

        Ok(Self(agents))
    }

    /// Creates a roster from raw names.
    ///
    /// # Errors
    ///
    /// Returns the first [`AgentName`] validation failure, or any error from
    /// [`Self::new`].
    pub fn from_names<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents = names
            .into_iter()
            .map(AgentName::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(agents)
    }

    /// Creates the roster `coder1..coderN`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAgentRoster`] when `count` is zero or
    /// [`ValidationError::RosterTooLarge`] when it exceeds
    /// [`MAX_NUMBERED_AGENTS`].
    pub fn numbered(count: usize) -> Result<Self, ValidationError> {
        if count > MAX_NUMBERED_AGENTS {
            return Err(ValidationError::RosterTooLarge(count));
        }
        Self::from_names((1..=count).map(|n| format!("{NUMBERED_AGENT_PREFIX}{n}")))
    }

    /// Returns the agents in roster order.
    #[must_use]
    pub fn as_slice(&self) -> &[AgentName] {
        &self.0
    }

    /// Iterates the agents in roster order.
    pub fn iter(&self) -> std::slice::Iter<'_, AgentName> {
        self.0.iter()
    }

    /// Returns the number of agents in the roster.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed roster.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether `agent` is part of this roster.
    #[must_use]
    pub fn contains(&self, agent: &AgentName) -> bool {
        self.0.contains(agent)
    }
}

impl<'a> IntoIterator for &'a AgentRoster {
    type Item = &'a AgentName;
    type IntoIter = std::slice::Iter<'a, AgentName>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Agent set as accepted on the wire: a count `N` (meaning
/// `coder1..coderN`) or an explicit list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentSelection {
    /// Generate `coder1..coderN`.
    Count(usize),
    /// Use these names in order.
    Names(Vec<String>),
}

impl AgentSelection {
    /// Validates the selection into a roster.
    ///
    /// # Errors
    ///
    /// Returns any [`AgentRoster`] construction error.
    pub fn into_roster(self) -> Result<AgentRoster, ValidationError> {
        match self {
            Self::Count(count) => AgentRoster::numbered(count),
            Self::Names(names) => AgentRoster::from_names(names),
        }
    }
}

impl Default for AgentSelection {
    fn default() -> Self {
        Self::Count(1)
    }
}

impl From<&AgentRoster> for AgentSelection {
    fn from(roster: &AgentRoster) -> Self {
        Self::Names(roster.iter().map(|agent| agent.as_str().to_owned()).collect())
    }
}
