//! Typed errors for the places where callers need to match on the kind.
//!
//! User-input edge cases (empty input, whitespace, zero matches) are never
//! errors; they are ordinary [`SearchOutcome`](crate::models::SearchOutcome)s.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    /// The record source failed to load. Search stays idle.
    #[error("archive data unavailable: {0}")]
    DataUnavailable(String),

    /// A required collaborator was not supplied at wiring time.
    #[error("missing required binding: {0}")]
    MissingBinding(String),

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExplorerError {
    /// Build a [`ExplorerError::MissingBinding`] naming every absent binding.
    pub fn missing_bindings(names: &[&str]) -> Self {
        Self::MissingBinding(names.join(", "))
    }
}
