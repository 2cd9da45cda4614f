//! Terminal rendering of job view updates.
//!
//! [`TerminalView`] keeps a [`ViewState`] and prints each change to
//! stdout: log lines verbatim, status and progress as a one-line
//! summary whenever either changes.

use docsort_client::view::{DownloadLink, JobView, ViewState};
use docsort_core::job::JobStatus;

#[derive(Debug, Default)]
pub struct TerminalView {
    state: ViewState,
    /// Last printed `status progress message` line, to avoid repeats.
    last_summary: String,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    fn print_summary(&mut self) {
        let summary = format!(
            "status: {:<9} progress: {:>4}  {}",
            self.state.status.as_str(),
            self.state.progress_label,
            self.state.message
        );
        if summary != self.last_summary {
            println!("{}", summary.trim_end());
            self.last_summary = summary;
        }
    }
}

impl JobView for TerminalView {
    fn set_status(&mut self, status: &JobStatus) {
        self.state.set_status(status);
        self.print_summary();
    }

    fn set_progress_clamped(&mut self, pct: f64, label: &str) {
        self.state.set_progress_clamped(pct, label);
        self.print_summary();
    }

    fn set_message(&mut self, message: &str) {
        self.state.set_message(message);
        self.print_summary();
    }

    fn append_line(&mut self, line: String) {
        println!("{line}");
        self.state.append_line(line);
    }

    fn clear_downloads(&mut self) {
        self.state.clear_downloads();
    }

    fn add_download(&mut self, link: DownloadLink) {
        println!("  download: {:<26} {}", link.label, link.url);
        self.state.add_download(link);
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.state.set_controls_enabled(enabled);
    }

    fn show_selection(&mut self, summary: &str) {
        println!("{summary}");
        self.state.show_selection(summary);
    }
}
