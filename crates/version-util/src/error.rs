//! Error types for version-util.

use thiserror::Error;

/// Errors produced while parsing an npm range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The text is not valid npm range syntax
    #[error("invalid range {range:?}: {reason}")]
    Invalid { range: String, reason: String },

    /// The text names a dist-tag such as `latest`, not a range
    #[error("{0:?} is a dist-tag, not a version range")]
    Tag(String),
}
