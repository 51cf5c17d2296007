//! Error types for report generation

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Runner output error: {0}")]
    RunnerOutput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Attach the path an I/O operation was targeting
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
