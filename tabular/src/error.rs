//! Error types for transcoding operations.
//!
//! This module defines [`Error`], the error type for decoding rows and
//! encoding records, along with a convenient [`Result`] type alias.

use common::StorageError;

use crate::model::LogicalType;

/// Error type for transcoding operations.
///
/// Every variant is fatal for the record or row being transcoded. Conditions
/// that only omit a column (a scalar with no destination, a null map entry,
/// a lossy timestamp narrowing) are logged and never surface here.
///
/// # Error Categories
///
/// - [`Config`](Error::Config): A malformed column-spec definition or other
///   invalid engine configuration.
/// - [`UnsupportedType`](Error::UnsupportedType): A field whose value cannot be
///   encoded as its declared logical type.
/// - [`Format`](Error::Format): A textual value that does not parse as the
///   number it is expected to be.
/// - [`InvalidInput`](Error::InvalidInput): A row or record that violates the
///   shape the engine expects, such as an empty row.
/// - [`Storage`](Error::Storage): Errors from the cell store collaborator.
/// - [`Internal`](Error::Internal): Unexpected internal errors that indicate bugs
///   or invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid engine configuration.
    Config(String),

    /// The value at `position` has no encoding as the resolved logical type.
    ///
    /// `observed` is the logical type of the value actually found in the
    /// record, which differs from the declared type when a schema is present.
    UnsupportedType {
        position: usize,
        observed: LogicalType,
    },

    /// The value at `position` could not be parsed.
    Format { position: usize, message: String },

    /// The caller supplied a row or record of the wrong shape.
    InvalidInput(String),

    /// Storage-related errors from the cell store.
    Storage(String),

    /// Internal errors indicating bugs or invariant violations.
    Internal(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Config error: {}", msg),
            Error::UnsupportedType { position, observed } => write!(
                f,
                "Unsupported type: no converter for {:?} field at position {}",
                observed, position
            ),
            Error::Format { position, message } => {
                write!(f, "Format error at position {}: {}", position, message)
            }
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Storage(msg) => Error::Storage(msg),
            StorageError::Internal(msg) => Error::Internal(msg),
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::InvalidInput(msg.to_string())
    }
}

/// Result type alias for transcoding operations.
///
/// This is a convenience alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
