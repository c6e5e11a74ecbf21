//! Error types for the MARL crate

use thiserror::Error;

use crate::identifiers::{ActionId, StateId};

/// Main error type for the MARL crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid {kind} '{input}'. Expected one of: {expected}")]
    ParseMode {
        kind: String,
        input: String,
        expected: String,
    },

    #[error("unknown state {state}")]
    UnknownState { state: StateId },

    #[error("unknown action {action}")]
    UnknownAction { action: ActionId },

    #[error("state {state} is declared more than once")]
    DuplicateState { state: StateId },

    #[error("action {action} is declared more than once")]
    DuplicateAction { action: ActionId },

    #[error("action {action} has no transitions")]
    ActionWithoutTransitions { action: ActionId },

    #[error("start index {index} is out of range (problem has {count} states)")]
    StartStateOutOfRange { index: usize, count: usize },

    #[error("temperature {value} must be positive and finite")]
    InvalidTemperature { value: f64 },

    #[error("cannot select from an empty value vector")]
    EmptyValues,

    #[error("q-table has no entry for state {state}, action {action}")]
    MissingQEntry { state: StateId, action: ActionId },

    #[error(
        "no response for request {request_number} before the deadline ({received}/{expected} peers answered)"
    )]
    ResponseTimeout {
        request_number: u32,
        received: usize,
        expected: usize,
    },

    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("malformed protocol frame: {message}")]
    Protocol { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// Attach an operation description to an I/O error.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}
