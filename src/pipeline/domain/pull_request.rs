//! Pull request URL value object.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Pull request URL reported by an agent.
///
/// Only the scheme is checked; the remainder is opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestUrl(String);

impl PullRequestUrl {
    /// Creates a validated pull request URL.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPullRequestUrl`] when the trimmed
    /// value does not start with `http://` or `https://`, or has nothing
    /// after the scheme.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let normalized = raw.trim();

        let has_location = ACCEPTED_SCHEMES.iter().any(|scheme| {
            normalized
                .strip_prefix(scheme)
                .is_some_and(|rest| !rest.is_empty())
        });

        if !has_location || normalized.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidPullRequestUrl(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PullRequestUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PullRequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
