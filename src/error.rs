use crate::review::cursor::Direction;
use crate::review::ledger::Status;
use std::fmt;

/// Broad category of a [`ReviewError`], letting callers pick a recovery
/// strategy without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Precondition,
    Validation,
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Precondition => write!(f, "precondition"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::NotFound => write!(f, "not found"),
        }
    }
}

/// Errors returned by the scan-and-review engine.
///
/// Failing operations leave the engine state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("generic and project dictionaries must be loaded before scanning")]
    DictionariesNotLoaded,

    #[error("the document has not finished scanning")]
    ScanIncomplete,

    #[error("the document import was aborted before the scan finished")]
    ImportAborted,

    #[error("no exception is selected; advance to the first exception")]
    NoCurrentException,

    #[error("'{0}' is already in the project dictionary")]
    DuplicateDictionaryEntry(String),

    #[error("exception index {index} is out of range (ledger holds {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("'{0}' is not a valid outcome for a change")]
    InvalidTargetStatus(Status),

    #[error("no unresolved exception {0}")]
    NoUnresolvedEntry(Direction),
}

impl ReviewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReviewError::DictionariesNotLoaded
            | ReviewError::ScanIncomplete
            | ReviewError::ImportAborted
            | ReviewError::NoCurrentException => ErrorKind::Precondition,
            ReviewError::DuplicateDictionaryEntry(_)
            | ReviewError::OutOfRange { .. }
            | ReviewError::InvalidTargetStatus(_) => ErrorKind::Validation,
            ReviewError::NoUnresolvedEntry(_) => ErrorKind::NotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
