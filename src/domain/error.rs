//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent tree-structure violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("row {row} out of range: parent has {count} children")]
    RowOutOfRange { row: usize, count: usize },

    #[error("rows {start}..{end} out of bounds: parent has {count} children")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        count: usize,
    },

    #[error("stale address: node no longer at row {row}")]
    StaleAddress { row: usize },

    #[error("value cannot be stored on a single line: {0:?}")]
    InvalidValue(String),

    #[error("the root node cannot be moved")]
    RootNotMovable,

    #[error("cannot move a node into itself or one of its descendants")]
    CycleDetected,

    #[error("transfer payload belongs to another session")]
    ForeignSession,

    #[error("unsupported drop action: {0}")]
    UnsupportedAction(String),

    #[error("unknown transfer format: {0}")]
    UnknownFormat(String),

    #[error("malformed transfer payload: {0}")]
    MalformedPayload(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
