//! Job status and status-snapshot types.
//!
//! [`JobSnapshot`] is the client-side view of `GET /api/job/{job_id}`.
//! The client never mutates a job; it only re-reads snapshots and
//! mirrors the latest one into its view.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// No job is active in this session.
pub const STATUS_IDLE: &str = "idle";
/// Files are being uploaded to the backend.
pub const STATUS_UPLOADING: &str = "uploading";
/// The backend accepted the job but has not started it.
pub const STATUS_QUEUED: &str = "queued";
/// The backend is processing the job.
pub const STATUS_RUNNING: &str = "running";
/// Processing finished and artifacts are available.
pub const STATUS_DONE: &str = "done";
/// Processing failed.
pub const STATUS_ERROR: &str = "error";
/// Processing stopped after a cancellation request.
pub const STATUS_CANCELLED: &str = "cancelled";

/// Lifecycle status of a job as observed by the client.
///
/// Strings the client does not recognise are kept in
/// [`JobStatus::Unknown`] and treated as non-terminal so that a newer
/// backend cannot stall the poll loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Idle,
    Uploading,
    Queued,
    Running,
    Done,
    Error,
    Cancelled,
    Unknown(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => STATUS_IDLE,
            Self::Uploading => STATUS_UPLOADING,
            Self::Queued => STATUS_QUEUED,
            Self::Running => STATUS_RUNNING,
            Self::Done => STATUS_DONE,
            Self::Error => STATUS_ERROR,
            Self::Cancelled => STATUS_CANCELLED,
            Self::Unknown(s) => s,
        }
    }

    /// `done`, `error` and `cancelled` admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancelled)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            STATUS_IDLE => Self::Idle,
            STATUS_UPLOADING => Self::Uploading,
            STATUS_QUEUED => Self::Queued,
            STATUS_RUNNING => Self::Running,
            STATUS_DONE => Self::Done,
            STATUS_ERROR => Self::Error,
            STATUS_CANCELLED => Self::Cancelled,
            _ => Self::Unknown(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact key (e.g. `csv_log`) to URL path. Values may be `null`.
pub type Downloads = BTreeMap<String, Option<String>>;

/// One status response from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Echo of the polled id; older backends omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub status: JobStatus,
    /// Raw percentage as reported; may fall outside 0-100.
    #[serde(default)]
    pub progress_pct: f64,
    #[serde(default)]
    pub message: String,
    /// Most recent log lines. The backend may resend an overlapping tail.
    #[serde(default)]
    pub log_tail: Vec<String>,
    /// Present once the job is `done`; `null` before that.
    #[serde(default)]
    pub downloads: Option<Downloads>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub processed_pages: u64,
    #[serde(default)]
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Unknown("paused".into()).is_terminal());
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status: JobStatus = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(status, JobStatus::Unknown("paused".into()));
        assert_eq!(status.as_str(), "paused");
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"paused\"");
    }

    #[test]
    fn snapshot_parses_running_response_with_null_downloads() {
        let json = serde_json::json!({
            "job_id": "abc",
            "status": "running",
            "progress_pct": 42,
            "message": "a.pdf: page 3/7",
            "error": null,
            "processed_pages": 2,
            "total_pages": 7,
            "downloads": null,
            "log_tail": ["Processing: a.pdf"]
        });

        let snap: JobSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snap.status, JobStatus::Running);
        assert_eq!(snap.progress_pct, 42.0);
        assert_eq!(snap.total_pages, 7);
        assert!(snap.downloads.is_none());
        assert_eq!(snap.log_tail, vec!["Processing: a.pdf".to_string()]);
    }

    #[test]
    fn snapshot_tolerates_minimal_body() {
        let snap: JobSnapshot = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(snap.status, JobStatus::Queued);
        assert_eq!(snap.progress_pct, 0.0);
        assert!(snap.message.is_empty());
        assert!(snap.log_tail.is_empty());
        assert!(snap.error.is_none());
    }

    #[test]
    fn snapshot_without_status_is_rejected() {
        assert!(serde_json::from_str::<JobSnapshot>(r#"{"progress_pct":5}"#).is_err());
    }
}
