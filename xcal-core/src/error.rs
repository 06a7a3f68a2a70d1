//! Error types for the xcal ecosystem.

use thiserror::Error;

/// Errors that can occur in xcal operations.
#[derive(Error, Debug)]
pub enum XcalError {
    /// Malformed document, text taken verbatim from the reader.
    #[error("{0}")]
    Parse(String),

    /// Non-empty error capture from the external tool, verbatim.
    #[error("{0}")]
    Tool(String),

    /// Writer returned something other than the `OK` sentinel.
    #[error("{0}")]
    Write(String),

    #[error("Reader returned {records} records but {details} details")]
    StoreMismatch { records: usize, details: usize },

    #[error("no selection")]
    SelectionNotFound,

    #[error("{0}")]
    PersistenceConflict(String),

    #[error("Component store used after its document was released")]
    StoreReleased,

    #[error("No calendar file is open")]
    NoDocument,

    #[error("Component index {0} is out of range")]
    ComponentIndex(usize),

    #[error("Nothing to undo")]
    UndoUnavailable,

    #[error("External tool not found: {0}")]
    ToolNotInstalled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl XcalError {
    /// Informational errors are reported as a status line, never as a failure.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            XcalError::SelectionNotFound | XcalError::PersistenceConflict(_)
        )
    }
}

/// Result type alias for xcal operations.
pub type XcalResult<T> = Result<T, XcalError>;
