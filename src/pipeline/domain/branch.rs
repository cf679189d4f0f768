//! Target branch value object for orchestrations.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a target branch name.
const MAX_BRANCH_NAME_LENGTH: usize = 200;

/// Branch used when an orchestration does not name one.
pub const DEFAULT_TARGET_BRANCH: &str = "main";

/// Validated Git branch that agents should target.
///
/// Branch names must be non-empty after trimming, must not contain
/// whitespace, `:` or `..`, and must not exceed 200 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTargetBranch`] when the value
    /// violates any of the naming rules.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let normalized = raw.trim();

        if Self::is_invalid_branch_name(normalized) {
            return Err(ValidationError::InvalidTargetBranch(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    fn is_invalid_branch_name(name: &str) -> bool {
        let is_empty = name.is_empty();
        let contains_forbidden = name.contains(':')
            || name.contains("..")
            || name.chars().any(char::is_whitespace);
        let exceeds_length_limit = name.len() > MAX_BRANCH_NAME_LENGTH;

        is_empty || contains_forbidden || exceeds_length_limit
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self(DEFAULT_TARGET_BRANCH.to_owned())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
