//! Errors raised while tokenizing a single report line.
//!
//! None of these abort a run: the aggregator logs the error and drops the line.

/// A line that could not be turned into a mapping record or a totals row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed line ({reason}): {line:?}")]
    MalformedLine { line: String, reason: &'static str },

    #[error("permission string too short: {found:?} (expected 5 flag positions)")]
    PermissionStringTooShort { found: String },
}

impl ParseError {
    pub(crate) fn malformed(line: &str, reason: &'static str) -> Self {
        ParseError::MalformedLine {
            line: line.to_string(),
            reason,
        }
    }
}
