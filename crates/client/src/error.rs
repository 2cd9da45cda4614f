use std::path::PathBuf;

use docsort_core::error::CoreError;
use docsort_core::types::JobId;

use crate::api::ApiError;

/// Errors surfaced by [`JobSession`](crate::session::JobSession) and the
/// poll task.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Submission attempted with an empty file selection.
    #[error("Select at least one PDF before starting a job")]
    NoFiles,

    /// A selected path is missing or not a regular file.
    #[error("Cannot upload {}: {reason}", path.display())]
    InvalidFile { path: PathBuf, reason: String },

    /// A job is already being tracked by this session.
    #[error("Job {0} is still active")]
    JobActive(JobId),

    /// An operation needed a job id but none is set.
    #[error("No active job")]
    NoActiveJob,

    /// The backend rejected a request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Invalid configuration or processing options.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A downloaded artifact could not be written to disk.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The poll task panicked or was aborted.
    #[error("Poll task failed: {0}")]
    Task(String),
}

impl From<CoreError> for ClientError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(msg) => Self::Config(msg),
        }
    }
}
