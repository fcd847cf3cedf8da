//! Errors reported by maps, views, cursors and entry handles.

use std::result;
use thiserror::Error;

/// The error type for fallible map, view and cursor operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An index argument lies outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The length of the map or view the index was checked against.
        len: usize,
    },

    /// An index range does not satisfy `start <= end <= len`.
    #[error("index range {start}..{end} out of range for length {len}")]
    InvalidIndexRange {
        /// The requested start index.
        start: usize,
        /// The requested end index.
        end: usize,
        /// The length of the map or view the range was checked against.
        len: usize,
    },

    /// A key range whose lower bound compares greater than its upper bound.
    #[error("range start is greater than range end")]
    InvalidKeyRange,

    /// A key outside the range permitted by a view.
    #[error("key out of range")]
    KeyOutOfRange,

    /// The map was structurally modified through another handle.
    #[error("map was modified through another handle")]
    ConcurrentModification,

    /// The operation is not supported by this handle.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    /// The map or view is empty.
    #[error("no such element")]
    NotFound,

    /// The handle is not in a state that permits the operation.
    #[error("{0}")]
    IllegalState(&'static str),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = result::Result<T, Error>;
