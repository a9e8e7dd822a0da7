//! Error types for the workflow library

use std::path::PathBuf;
use thiserror::Error;

use crate::core::json::JsonDecodeError;

/// Errors surfaced by the workflow library
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// JSON payload could not be decoded
    #[error(transparent)]
    JsonDecode(#[from] JsonDecodeError),

    /// Payload decoded to something other than an object or array
    #[error("payload must be an object, an array or a JSON string; found a {found} instead")]
    InvalidPayloadType { found: &'static str },

    /// XML writer failure
    #[error("failed to write XML: {0}")]
    XmlWrite(String),

    /// A required external command is not on PATH
    #[error("{0} is not installed or not on PATH")]
    CommandNotFound(String),

    /// Home directory could not be determined
    #[error("could not determine the home directory")]
    HomeNotFound,

    /// Neither an explicit bundle id nor one in info.plist
    #[error("no bundle id given and none found in info.plist")]
    MissingBundleId,

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkflowError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorkflowError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = WorkflowError> = std::result::Result<T, E>;
