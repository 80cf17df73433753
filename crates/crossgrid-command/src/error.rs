use crossgrid_core::ErrorType;
use crossgrid_grid::GridError;

/// A command refused by its precondition check.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{reason}")]
pub struct CommandRejected {
    /// Placement violations behind the refusal, empty for other reasons.
    pub errors: ErrorType,
    /// Human-readable explanation.
    pub reason: String,
}

impl CommandRejected {
    /// Creates a refusal caused by placement violations.
    #[must_use]
    pub fn placement(errors: ErrorType) -> Self {
        Self {
            errors,
            reason: errors.to_string(),
        }
    }
}

impl From<GridError> for CommandRejected {
    fn from(error: GridError) -> Self {
        Self {
            errors: error.placement_errors(),
            reason: error.to_string(),
        }
    }
}

/// Errors reading or writing the binary command log.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LogError {
    /// The buffer ended in the middle of a record.
    #[display("unexpected end of log at byte {offset}")]
    UnexpectedEnd {
        /// Byte offset where more data was expected.
        offset: usize,
    },
    /// A record starts with a tag no command kind uses.
    #[display("unknown command tag {tag} at byte {offset}")]
    UnknownTag {
        /// The unknown tag.
        tag: u8,
        /// Byte offset of the tag.
        offset: usize,
    },
    /// A text field is not valid UTF-8.
    #[display("invalid text at byte {offset}")]
    InvalidText {
        /// Byte offset of the text field.
        offset: usize,
    },
    /// A field holds a value outside its domain.
    #[display("invalid {what} at byte {offset}")]
    InvalidValue {
        /// Name of the field.
        what: &'static str,
        /// Byte offset of the field.
        offset: usize,
    },
    /// A text or list is too long for its length prefix.
    #[display("{what} of length {len} does not fit the log format")]
    TooLong {
        /// Name of the field.
        what: &'static str,
        /// The rejected length.
        len: usize,
    },
    /// The stored cursor points past the last record.
    #[display("cursor {cursor} exceeds the {records} stored records")]
    CursorOutOfRange {
        /// The stored cursor.
        cursor: u16,
        /// The number of records read.
        records: usize,
    },
    /// A record decoded but could not be applied to the grid.
    #[display("record {index} cannot be replayed: {reason}")]
    ReplayRejected {
        /// Zero-based record index.
        index: usize,
        /// Why the command failed.
        reason: String,
    },
}

/// Errors returned by [`CommandStack`](crate::CommandStack) operations.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum StackError {
    /// The command's precondition check failed; nothing changed.
    #[display("command rejected: {_0}")]
    Rejected(#[from] CommandRejected),
    /// The grid refused a mutation.
    #[display("grid error: {_0}")]
    Grid(#[from] GridError),
    /// The log already holds the maximum number of records.
    #[display("the command log is full")]
    LogFull,
    /// The command could not be encoded.
    #[display("log error: {_0}")]
    Log(#[from] LogError),
}
