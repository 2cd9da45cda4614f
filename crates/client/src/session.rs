//! Job session controller.
//!
//! A [`JobSession`] owns everything the client knows about the one job
//! it tracks: the job id, the poll sequence counters, the rendered
//! download links and the view. Every view update goes through it, so a
//! status response is applied to the view in a single call.

use std::path::{Path, PathBuf};

use docsort_core::artifacts::present_artifacts;
use docsort_core::job::{JobSnapshot, JobStatus};
use docsort_core::options::ProcessingOptions;
use docsort_core::progress::message_with_pages;
use docsort_core::selection::{is_pdf, summarize_selection};
use docsort_core::types::JobId;

use crate::api::{ApiError, JobApi};
use crate::error::ClientError;
use crate::view::{DownloadLink, JobView};

/// Guidance shown when a submission has no files.
pub const NO_FILES_MESSAGE: &str = "Please select at least one PDF file.";

/// Result of applying one status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Snapshot applied; the job is still in progress.
    Applied(JobStatus),
    /// Snapshot applied and the job reached a terminal status.
    Finished(JobStatus),
    /// Response was older than one already applied and was dropped.
    Stale,
    /// The request failed; polling should continue.
    Failed,
    /// No job is being tracked.
    Idle,
}

impl PollOutcome {
    /// Whether the poll loop should stop after this outcome.
    pub fn ends_polling(&self) -> bool {
        matches!(self, Self::Finished(_) | Self::Idle)
    }
}

pub struct JobSession<V> {
    api: JobApi,
    view: V,
    job_id: Option<JobId>,
    /// Id of the most recently finished job, kept for artifact downloads.
    last_job_id: Option<JobId>,
    next_seq: u64,
    last_applied_seq: u64,
    artifacts: Vec<DownloadLink>,
}

impl<V: JobView> JobSession<V> {
    pub fn new(api: JobApi, view: V) -> Self {
        Self {
            api,
            view,
            job_id: None,
            last_job_id: None,
            next_seq: 0,
            last_applied_seq: 0,
            artifacts: Vec::new(),
        }
    }

    pub fn api(&self) -> &JobApi {
        &self.api
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Id of the job currently being tracked.
    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.job_id.is_some()
    }

    /// Download links rendered for the last finished job.
    pub fn artifacts(&self) -> &[DownloadLink] {
        &self.artifacts
    }

    /// Show a summary of the current selection (count and names).
    pub fn select_files(&mut self, files: &[PathBuf]) {
        self.view.show_selection(&summarize_selection(files));
    }

    /// Submit `files` with the configured processing options.
    pub async fn submit(&mut self, files: &[PathBuf]) -> Result<JobId, ClientError> {
        let options = self.api.config().options.clone();
        self.submit_with(files, &options).await
    }

    /// Upload `files` and start tracking the created job.
    ///
    /// Validation failures are reported without any network call. On
    /// success the session is `running` and ready for polling; on a
    /// backend or network failure the status becomes `error` and the
    /// controls are re-enabled.
    pub async fn submit_with(
        &mut self,
        files: &[PathBuf],
        options: &ProcessingOptions,
    ) -> Result<JobId, ClientError> {
        if let Some(active) = &self.job_id {
            self.view
                .log(&format!("Job {active} is still running. Wait for it or cancel it first."));
            return Err(ClientError::JobActive(active.clone()));
        }

        if files.is_empty() {
            self.view.log(NO_FILES_MESSAGE);
            return Err(ClientError::NoFiles);
        }

        if let Err(e) = options.validate() {
            self.view.log(&e.to_string());
            return Err(e.into());
        }

        for path in files {
            if let Err(e) = check_file(path).await {
                self.view.log(&e.to_string());
                return Err(e);
            }
        }

        for path in files.iter().filter(|p| !is_pdf(p)) {
            self.view.log(&format!(
                "Warning: {} is not a .pdf file and will be ignored by the server.",
                path.display()
            ));
        }

        self.view.set_controls_enabled(false);
        self.view.set_status(&JobStatus::Uploading);
        self.view.set_progress(0.0);
        self.view.set_message("Uploading…");
        self.view.clear_downloads();
        self.artifacts.clear();
        self.view.log(&format!("Uploading {} file(s)…", files.len()));

        tracing::info!(
            files = files.len(),
            dpi = options.dpi,
            sleep_sec = options.sleep_sec,
            model = %options.model,
            "Submitting job",
        );

        match self.api.create_job(files, options).await {
            Ok(job_id) => {
                tracing::info!(job_id = %job_id, "Job created");
                self.track(job_id.clone());
                self.view.set_message("Job started");
                self.view
                    .log(&format!("Job {job_id} created. Polling for status…"));
                Ok(job_id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Job submission failed");
                self.view.log(&format!("Upload failed: {}", user_message(&e)));
                self.view.set_status(&JobStatus::Error);
                self.view.set_message("Upload failed");
                self.view.set_controls_enabled(true);
                Err(e.into())
            }
        }
    }

    /// Start tracking a job that was submitted elsewhere.
    pub fn attach(&mut self, job_id: JobId) -> Result<(), ClientError> {
        if let Some(active) = &self.job_id {
            return Err(ClientError::JobActive(active.clone()));
        }
        self.view.clear_downloads();
        self.artifacts.clear();
        self.view.log(&format!("Watching job {job_id}…"));
        self.track(job_id);
        Ok(())
    }

    /// Issue one status request and apply the response.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let Some(job_id) = self.job_id.clone() else {
            return PollOutcome::Idle;
        };
        let seq = self.next_poll_seq();
        let result = self.api.get_job(&job_id).await;
        self.apply_poll(seq, result)
    }

    /// Allocate the sequence number for the next status request.
    pub fn next_poll_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Apply the result of the status request numbered `seq`.
    ///
    /// Responses not newer than the last applied one are dropped, so a
    /// late response can never overwrite a fresher snapshot. Failed
    /// requests are logged and leave the session untouched.
    pub fn apply_poll(&mut self, seq: u64, result: Result<JobSnapshot, ApiError>) -> PollOutcome {
        let Some(job_id) = self.job_id.clone() else {
            return PollOutcome::Idle;
        };

        if seq <= self.last_applied_seq {
            tracing::debug!(
                job_id = %job_id,
                seq,
                last_applied = self.last_applied_seq,
                "Dropping stale status response",
            );
            return PollOutcome::Stale;
        }

        match result {
            Ok(snapshot) => {
                self.last_applied_seq = seq;
                self.apply_snapshot(&job_id, snapshot)
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, seq, error = %e, "Status poll failed");
                self.view.log(&format!("Poll error: {}", user_message(&e)));
                PollOutcome::Failed
            }
        }
    }

    /// Ask the backend to cancel the tracked job.
    ///
    /// Does not change the status; the terminal `cancelled` state
    /// arrives through a later poll. Without a job id nothing is sent.
    pub async fn request_cancel(&mut self) -> Result<(), ClientError> {
        let Some(job_id) = self.job_id.clone() else {
            return Err(ClientError::NoActiveJob);
        };

        match self.api.cancel_job(&job_id).await {
            Ok(()) => {
                tracing::info!(job_id = %job_id, "Cancellation requested");
                self.view.log("Cancellation requested.");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Cancel request failed");
                self.view.log(&format!("Cancel failed: {}", user_message(&e)));
                Err(e.into())
            }
        }
    }

    /// Stop tracking the current job locally, without contacting the
    /// backend. The view returns to idle.
    pub fn stop_polling(&mut self) {
        if let Some(job_id) = self.job_id.take() {
            tracing::info!(job_id = %job_id, "Stopped polling");
            self.view.log(&format!(
                "Stopped watching job {job_id}. It may still be running on the server."
            ));
            self.view.set_status(&JobStatus::Idle);
            self.view.set_progress(0.0);
            self.view.set_controls_enabled(true);
        }
    }

    /// Save every artifact of the last finished job into `dir` as
    /// `<job_id>_<kind>.<ext>`.
    ///
    /// A failed artifact is logged and skipped. Returns the written
    /// paths.
    pub async fn download_artifacts(&mut self, dir: &Path) -> Result<Vec<PathBuf>, ClientError> {
        let Some(job_id) = self.last_job_id.clone() else {
            return Ok(Vec::new());
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ClientError::Write {
                path: dir.to_path_buf(),
                source,
            })?;

        let mut saved = Vec::with_capacity(self.artifacts.len());
        for link in self.artifacts.clone() {
            let target = dir.join(format!(
                "{job_id}_{}.{}",
                link.kind.slug(),
                link.kind.extension()
            ));

            let bytes = match self.api.download_artifact(&link.url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(job_id = %job_id, url = %link.url, error = %e, "Artifact download failed");
                    self.view
                        .log(&format!("Download of {} failed: {}", link.label, user_message(&e)));
                    continue;
                }
            };

            match tokio::fs::write(&target, &bytes).await {
                Ok(()) => {
                    self.view
                        .log(&format!("Saved {} to {}", link.label, target.display()));
                    saved.push(target);
                }
                Err(e) => {
                    tracing::warn!(path = %target.display(), error = %e, "Failed to write artifact");
                    self.view
                        .log(&format!("Could not write {}: {e}", target.display()));
                }
            }
        }

        Ok(saved)
    }

    // ---- private helpers ----

    fn track(&mut self, job_id: JobId) {
        self.job_id = Some(job_id);
        self.next_seq = 0;
        self.last_applied_seq = 0;
        self.view.set_controls_enabled(false);
        self.view.set_status(&JobStatus::Running);
        self.view.set_progress(0.0);
    }

    fn apply_snapshot(&mut self, job_id: &JobId, snapshot: JobSnapshot) -> PollOutcome {
        let status = snapshot.status;

        self.view.set_status(&status);
        self.view.set_progress(snapshot.progress_pct);
        self.view.set_message(&message_with_pages(
            &snapshot.message,
            snapshot.processed_pages,
            snapshot.total_pages,
        ));
        for line in &snapshot.log_tail {
            self.view.log(line);
        }

        match status {
            JobStatus::Done => {
                self.view.clear_downloads();
                self.artifacts.clear();
                if let Some(downloads) = &snapshot.downloads {
                    for (kind, path) in present_artifacts(downloads) {
                        let link = DownloadLink::new(kind, self.api.url(path));
                        self.view.add_download(link.clone());
                        self.artifacts.push(link);
                    }
                }
                self.view.log("Job complete. Downloads are ready.");
                tracing::info!(job_id = %job_id, artifacts = self.artifacts.len(), "Job finished");
                self.finish();
                PollOutcome::Finished(JobStatus::Done)
            }
            JobStatus::Error | JobStatus::Cancelled => {
                let line = match snapshot.error.as_deref().filter(|e| !e.trim().is_empty()) {
                    Some(detail) => format!("Job {status}: {detail}"),
                    None => format!("Job {status}."),
                };
                self.view.log(&line);
                tracing::info!(job_id = %job_id, status = %status, error = ?snapshot.error, "Job ended");
                self.finish();
                PollOutcome::Finished(status)
            }
            other => PollOutcome::Applied(other),
        }
    }

    fn finish(&mut self) {
        self.last_job_id = self.job_id.take();
        self.view.set_controls_enabled(true);
    }
}

/// Text shown to the user for an API failure. Backend rejections show
/// the response body as-is.
fn user_message(e: &ApiError) -> String {
    match e {
        ApiError::Status { status, body } if body.trim().is_empty() => {
            format!("server returned HTTP {status}")
        }
        ApiError::Status { body, .. } => body.clone(),
        other => other.to_string(),
    }
}

async fn check_file(path: &Path) -> Result<(), ClientError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ClientError::InvalidFile {
            path: path.to_path_buf(),
            reason: "not a regular file".into(),
        }),
        Err(e) => Err(ClientError::InvalidFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}
