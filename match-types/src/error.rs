//! Error types for the wire codec.

use thiserror::Error;

/// A received payload could not be turned into a board.
///
/// The message must be dropped and local state left unchanged.
#[derive(Debug, Error)]
pub enum MalformedPayload {
    /// Byte payload is not valid UTF-8
    #[error("malformed payload: not valid UTF-8: {0}")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),

    /// Text is not valid JSON
    #[error("malformed payload: not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// JSON value is not an array
    #[error("malformed payload: expected a JSON array")]
    NotAnArray,

    /// Array does not have exactly nine elements
    #[error("malformed payload: expected 9 cells, got {0}")]
    WrongLength(usize),

    /// Array element is not null, "X" or "O"
    #[error("malformed payload: invalid cell {index}: {value}")]
    InvalidCell {
        /// Position of the offending element.
        index: usize,
        /// The element as JSON text.
        value: String,
    },
}
