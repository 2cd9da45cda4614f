//! Presentation layer for a job session.
//!
//! [`JobView`] is the set of view updates a session performs: status
//! pill, progress bar, message line, timestamped log, downloads list and
//! the enabled state of the input controls. [`ViewState`] records those
//! updates in memory; front ends either use it directly or wrap it.

use chrono::Local;
use docsort_core::artifacts::ArtifactKind;
use docsort_core::job::JobStatus;
use docsort_core::progress::{clamp_progress, progress_label};
use serde::Serialize;

/// A rendered download link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    #[serde(skip)]
    pub kind: ArtifactKind,
    pub label: String,
    pub url: String,
}

impl DownloadLink {
    pub fn new(kind: ArtifactKind, url: String) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            url,
        }
    }
}

/// View updates driven by a [`JobSession`](crate::session::JobSession).
///
/// Only [`append_line`](Self::append_line) and the setters are required;
/// the provided methods apply the shared formatting rules (progress
/// clamping, log timestamps).
pub trait JobView {
    fn set_status(&mut self, status: &JobStatus);

    /// Receives a value already clamped into `[0, 100]` and its label.
    fn set_progress_clamped(&mut self, pct: f64, label: &str);

    fn set_message(&mut self, message: &str);

    /// Append one fully formatted log line.
    fn append_line(&mut self, line: String);

    fn clear_downloads(&mut self);

    fn add_download(&mut self, link: DownloadLink);

    fn set_controls_enabled(&mut self, enabled: bool);

    fn show_selection(&mut self, summary: &str);

    /// Set the progress bar, clamping `pct` into `[0, 100]`.
    fn set_progress(&mut self, pct: f64) {
        let clamped = clamp_progress(pct);
        self.set_progress_clamped(clamped, &progress_label(clamped));
    }

    /// Append a log line prefixed with the local wall-clock time.
    fn log(&mut self, line: &str) {
        self.append_line(timestamped(line));
    }
}

/// `[HH:MM:SS] line` using local time.
pub fn timestamped(line: &str) -> String {
    format!("[{}] {line}", Local::now().format("%H:%M:%S"))
}

/// In-memory view model mirroring the last applied job snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub status: JobStatus,
    pub progress_pct: f64,
    pub progress_label: String,
    pub message: String,
    pub log: Vec<String>,
    pub downloads: Vec<DownloadLink>,
    pub controls_enabled: bool,
    pub selection: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status: JobStatus::Idle,
            progress_pct: 0.0,
            progress_label: progress_label(0.0),
            message: String::new(),
            log: Vec::new(),
            downloads: Vec::new(),
            controls_enabled: true,
            selection: String::new(),
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobView for ViewState {
    fn set_status(&mut self, status: &JobStatus) {
        self.status = status.clone();
    }

    fn set_progress_clamped(&mut self, pct: f64, label: &str) {
        self.progress_pct = pct;
        self.progress_label = label.to_string();
    }

    fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    fn append_line(&mut self, line: String) {
        self.log.push(line);
    }

    fn clear_downloads(&mut self) {
        self.downloads.clear();
    }

    fn add_download(&mut self, link: DownloadLink) {
        self.downloads.push(link);
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }

    fn show_selection(&mut self, summary: &str) {
        self.selection = summary.to_string();
    }
}
