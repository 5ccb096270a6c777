//! Fatal report-writing errors
//!
//! Every failure while materializing a report ends the run. Each variant
//! names the file or directory involved so the message alone is actionable.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ReportError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Error creating directory: {}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error creating file: {}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unable to write to report file item: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Bundled asset not found: {}", path.display())]
    ResourceMissing { path: PathBuf },
    #[error("Unable to encode result document: {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unexpected run event: {reason}")]
    InvalidEvent { reason: String },
}

impl ReportError {
    /// Path the failure is about, when there is one
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ReportError::DirectoryCreation { path, .. }
            | ReportError::FileOpen { path, .. }
            | ReportError::Io { path, .. }
            | ReportError::ResourceMissing { path }
            | ReportError::Serialize { path, .. } => Some(path),
            ReportError::InvalidEvent { .. } => None,
        }
    }

    pub(crate) fn invalid_event(reason: impl Into<String>) -> Self {
        ReportError::InvalidEvent {
            reason: reason.into(),
        }
    }
}
