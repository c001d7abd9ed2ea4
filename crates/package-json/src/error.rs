//! Error types for package-json.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file could not be read or written
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not JSON
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is JSON but not an object
    #[error("{0} is not a JSON object")]
    NotAnObject(PathBuf),
}

/// A key that is not one of the dependency sections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not a dependency section")]
pub struct UnknownSection(pub String);
