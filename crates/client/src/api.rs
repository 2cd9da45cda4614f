//! REST API client for the classifier backend.
//!
//! Wraps the job endpoints (submission, status, cancellation, artifact
//! download) using [`reqwest`].

use std::path::{Path, PathBuf};

use docsort_core::job::JobSnapshot;
use docsort_core::options::ProcessingOptions;
use docsort_core::selection::{display_name, is_pdf};
use docsort_core::types::JobId;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::ClientConfig;

/// Multipart field name used for every uploaded file.
pub const UPLOAD_FIELD: &str = "pdfs";

/// HTTP client for one backend.
#[derive(Clone)]
pub struct JobApi {
    client: reqwest::Client,
    config: ClientConfig,
}

/// Response returned by `POST /api/process`.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, or an
    /// undecodable body).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, shown to the user as-is.
        body: String,
    },

    /// A success response whose content could not be used.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An upload file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JobApi {
    /// Create an API client from `config`, applying its request timeout.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for a backend path or download link.
    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    /// Upload `files` and create a job.
    ///
    /// Sends `POST /api/process` with one `pdfs` part per file plus the
    /// `dpi`, `sleep_sec` and `model` fields. Returns the new job id.
    pub async fn create_job(
        &self,
        files: &[PathBuf],
        options: &ProcessingOptions,
    ) -> Result<JobId, ApiError> {
        let mut form = Form::new();
        for path in files {
            form = form.part(UPLOAD_FIELD, file_part(path).await?);
        }
        for (name, value) in options.form_fields() {
            form = form.text(name, value);
        }

        let response = self
            .client
            .post(self.url("/api/process"))
            .multipart(form)
            .send()
            .await?;

        let body: SubmitResponse = Self::parse_response(response).await?;
        JobId::new(body.job_id).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Fetch the current status snapshot of a job (`GET /api/job/{id}`).
    ///
    /// Bounded by `poll_timeout`; a late response is a request error.
    pub async fn get_job(&self, job_id: &JobId) -> Result<JobSnapshot, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/job/{job_id}")))
            .timeout(self.config.poll_timeout)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Ask the backend to stop a job (`POST /api/job/{id}/cancel`).
    ///
    /// Only signals intent; the job reports `cancelled` on a later poll.
    pub async fn cancel_job(&self, job_id: &JobId) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/job/{job_id}/cancel")))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Download an artifact given the path from a `downloads` mapping.
    pub async fn download_artifact(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(self.url(path)).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Content type announced for an uploaded file.
fn upload_mime(path: &Path) -> &'static str {
    if is_pdf(path) {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// Read a file into a multipart part named after the file.
async fn file_part(path: &Path) -> Result<Part, ApiError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let part = Part::bytes(bytes)
        .file_name(display_name(path))
        .mime_str(upload_mime(path))?;
    Ok(part)
}
