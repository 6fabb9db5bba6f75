//! Error types for row transformation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Required canonical columns absent after header normalization.
    #[error("missing required columns: {missing:?}; found columns: {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// A history segment does not follow `<Mon> <day>, <year> - <vaccine>`.
    #[error("malformed vaccination history segment {segment:?} at offset {offset}: {reason}")]
    MalformedHistory {
        segment: String,
        offset: usize,
        reason: &'static str,
    },

    /// A history date token is well-formed but not a real date.
    #[error("unparsable vaccination date {value:?}")]
    InvalidHistoryDate { value: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
