//! Lexical sanitisation of agent-reported workspace paths.
//!
//! Agents report the files they touched relative to their sandbox root. The
//! pipeline never resolves these against a filesystem; it only normalises
//! them and rejects anything that could point outside the sandbox.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum accepted length of a raw path.
const MAX_PATH_LENGTH: usize = 4096;

/// Errors raised when a path would leave the agent sandbox.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathTraversalError {
    /// The path is rooted or carries a drive prefix.
    #[error("unsafe path detected: '{0}' is absolute")]
    Absolute(String),
    /// A `..` component climbs above the sandbox root.
    #[error("unsafe path detected: '{0}' escapes the sandbox")]
    Escapes(String),
    /// The path is empty or normalises to the sandbox root itself.
    #[error("path '{0}' does not name a file inside the sandbox")]
    Empty(String),
    /// The path exceeds the accepted length.
    #[error("path exceeds {MAX_PATH_LENGTH} characters")]
    TooLong,
}

/// Normalised, sandbox-relative path using `/` separators.
///
/// # Examples
///
///     use refactory::pipeline::domain::SandboxPath;
///
///     let path = SandboxPath::parse("src/./lib/../main.rs").expect("safe path");
///     assert_eq!(path.as_str(), "src/main.rs");
///     assert!(SandboxPath::parse("../etc/passwd").is_err());
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SandboxPath(String);

impl SandboxPath {
    /// Normalises `raw` into a sandbox-relative path.
    ///
    /// Both `/` and `\` are treated as separators. `.` segments and empty
    /// segments are dropped and `..` pops the previous segment.
    ///
    /// # Errors
    ///
    /// Returns [`PathTraversalError::Absolute`] for rooted or drive-prefixed
    /// paths, [`PathTraversalError::Escapes`] when `..` climbs past the root,
    /// [`PathTraversalError::Empty`] when nothing remains after
    /// normalisation, and [`PathTraversalError::TooLong`] for oversized input.
    pub fn parse(raw: &str) -> Result<Self, PathTraversalError> {
        if raw.len() > MAX_PATH_LENGTH {
            return Err(PathTraversalError::TooLong);
        }

        let trimmed = raw.trim();
        if is_rooted(trimmed) {
            return Err(PathTraversalError::Absolute(raw.to_owned()));
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in trimmed.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathTraversalError::Escapes(raw.to_owned()));
                    }
                }
                part => segments.push(part),
            }
        }

        if segments.is_empty() {
            return Err(PathTraversalError::Empty(raw.to_owned()));
        }

        Ok(Self(segments.join("/")))
    }

    /// Returns the normalised path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_rooted(path: &str) -> bool {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some('/' | '\\'), _) => true,
        (Some(drive), Some(':')) => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

impl AsRef<str> for SandboxPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SandboxPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
