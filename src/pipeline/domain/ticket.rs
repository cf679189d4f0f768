//! Decoding of generator-produced ticket lists into task definitions.

use super::{TaskDefinition, ValidationError};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while decoding a ticket list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TicketDecodeError {
    /// The payload is not a JSON array of ticket objects.
    #[error("ticket list is not a JSON array of tickets: {0}")]
    Malformed(String),
    /// The payload decoded to an empty list.
    #[error("ticket list is empty")]
    Empty,
    /// A ticket failed task validation.
    #[error("ticket {index} is invalid: {source}")]
    InvalidTicket {
        /// Zero-based position of the ticket.
        index: usize,
        /// Validation failure.
        source: ValidationError,
    },
}

#[derive(Debug, Deserialize)]
struct WireTicket {
    title: String,
    #[serde(default, alias = "description")]
    detail: String,
}

/// Decodes a generator ticket list into validated task definitions.
///
/// Accepts a JSON array of `{ "title", "detail" }` objects, optionally
/// wrapped in a Markdown code fence. `description` is accepted in place of
/// `detail`.
///
/// # Errors
///
/// Returns [`TicketDecodeError::Malformed`] for anything that is not such an
/// array, [`TicketDecodeError::Empty`] for an empty array, and
/// [`TicketDecodeError::InvalidTicket`] for the first ticket with an empty
/// title.
///
/// # Examples
///
///     use refactory::pipeline::domain::decode_tickets;
///
///     let raw = "```json\n[{\"title\": \"Add login\", \"detail\": \"Form and route\"}]\n```";
///     let tasks = decode_tickets(raw).expect("valid tickets");
///     assert_eq!(tasks.len(), 1);
///     assert_eq!(tasks[0].title(), "Add login");
pub fn decode_tickets(raw: &str) -> Result<Vec<TaskDefinition>, TicketDecodeError> {
    let tickets: Vec<WireTicket> = serde_json::from_str(strip_code_fence(raw))
        .map_err(|err| TicketDecodeError::Malformed(err.to_string()))?;

    if tickets.is_empty() {
        return Err(TicketDecodeError::Empty);
    }

    tickets
        .into_iter()
        .enumerate()
        .map(|(index, ticket)| {
            TaskDefinition::new(ticket.title, ticket.detail)
                .map_err(|source| TicketDecodeError::InvalidTicket { index, source })
        })
        .collect()
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = fenced.split_once('\n').map_or_else(
        || fenced.trim_start_matches("json"),
        |(_, rest)| rest,
    );
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
