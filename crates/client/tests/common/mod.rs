#![allow(dead_code)]

//! Shared helpers for client integration tests: an in-process stub of the
//! classifier backend and session/fixture builders.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use docsort_client::api::JobApi;
use docsort_client::config::ClientConfig;
use docsort_client::session::JobSession;
use docsort_client::view::ViewState;

/// Poll interval used by tests; short enough to keep them fast.
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Scripted stand-in for the backend.
///
/// Status responses are served from a queue; the last one repeats once
/// the queue is down to a single entry.
pub struct StubBackend {
    submit: Mutex<(StatusCode, String)>,
    polls: Mutex<VecDeque<(StatusCode, Value)>>,
    pub submit_hits: AtomicUsize,
    pub poll_hits: AtomicUsize,
    pub cancel_hits: AtomicUsize,
    pub download_hits: AtomicUsize,
    pub uploaded: Mutex<Vec<String>>,
    pub content_types: Mutex<Vec<String>>,
    /// Number of upcoming status requests that never get an answer.
    hung_polls: AtomicUsize,
    pub fields: Mutex<Vec<(String, String)>>,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            submit: Mutex::new((StatusCode::OK, json!({ "job_id": "abc" }).to_string())),
            polls: Mutex::new(VecDeque::new()),
            submit_hits: AtomicUsize::new(0),
            poll_hits: AtomicUsize::new(0),
            cancel_hits: AtomicUsize::new(0),
            download_hits: AtomicUsize::new(0),
            uploaded: Mutex::new(Vec::new()),
            content_types: Mutex::new(Vec::new()),
            hung_polls: AtomicUsize::new(0),
            fields: Mutex::new(Vec::new()),
        })
    }

    pub fn reject_submit(&self, status: StatusCode, body: &str) {
        *self.submit.lock().unwrap() = (status, body.to_string());
    }

    pub fn push_poll(&self, body: Value) {
        self.polls.lock().unwrap().push_back((StatusCode::OK, body));
    }

    pub fn push_poll_error(&self, status: StatusCode, detail: &str) {
        self.polls
            .lock()
            .unwrap()
            .push_back((status, json!({ "detail": detail })));
    }

    /// Leave the next `count` status requests without a response.
    pub fn hang_polls(&self, count: usize) {
        self.hung_polls.store(count, Ordering::SeqCst);
    }

    pub fn submits(&self) -> usize {
        self.submit_hits.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.poll_hits.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancel_hits.load(Ordering::SeqCst)
    }

    pub fn field(&self, name: &str) -> Option<String> {
        self.fields
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }
}

/// Serve `backend` on an ephemeral local port and return its base URL.
pub async fn spawn_backend(backend: Arc<StubBackend>) -> String {
    let app = Router::new()
        .route("/api/process", post(create_job))
        .route("/api/job/{job_id}", get(get_job))
        .route("/api/job/{job_id}/cancel", post(cancel_job))
        .route("/api/job/{job_id}/download/{kind}", get(download))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// Session against `base_url` with a fast poll interval.
pub fn test_session(base_url: &str) -> JobSession<ViewState> {
    let config = ClientConfig {
        poll_interval: TEST_POLL_INTERVAL,
        ..ClientConfig::with_base_url(base_url)
    };
    let api = JobApi::new(config).unwrap();
    JobSession::new(api, ViewState::new())
}

/// Like [`test_session`] but with a custom status request deadline.
pub fn test_session_with_poll_timeout(base_url: &str, poll_timeout: Duration) -> JobSession<ViewState> {
    let config = ClientConfig {
        poll_interval: TEST_POLL_INTERVAL,
        poll_timeout,
        ..ClientConfig::with_base_url(base_url)
    };
    let api = JobApi::new(config).unwrap();
    JobSession::new(api, ViewState::new())
}

/// Write small placeholder files named `names` into `dir`.
pub fn write_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, b"%PDF-1.4\n%placeholder\n").unwrap();
            path
        })
        .collect()
}

/// Status body in the backend's shape.
pub fn status_body(status: &str, pct: u32, log_tail: &[&str]) -> Value {
    json!({
        "job_id": "abc",
        "status": status,
        "progress_pct": pct,
        "message": format!("{status} {pct}"),
        "error": null,
        "processed_pages": 0,
        "total_pages": 0,
        "downloads": null,
        "log_tail": log_tail,
    })
}

/// Log lines of `view` with the `[HH:MM:SS] ` prefix removed.
pub fn log_text(view: &ViewState) -> Vec<String> {
    view.log
        .iter()
        .map(|line| line.get(11..).unwrap_or(line).to_string())
        .collect()
}

// ---- handlers ----

async fn create_job(State(backend): State<Arc<StubBackend>>, mut multipart: Multipart) -> Response {
    backend.submit_hits.fetch_add(1, Ordering::SeqCst);

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "pdfs" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            backend.content_types.lock().unwrap().push(content_type);
            let _ = field.bytes().await;
            backend.uploaded.lock().unwrap().push(file_name);
        } else {
            let value = field.text().await.unwrap_or_default();
            backend.fields.lock().unwrap().push((name, value));
        }
    }

    let (status, body) = backend.submit.lock().unwrap().clone();
    (status, body).into_response()
}

async fn get_job(
    State(backend): State<Arc<StubBackend>>,
    UrlPath(job_id): UrlPath<String>,
) -> Response {
    backend.poll_hits.fetch_add(1, Ordering::SeqCst);

    let hang = backend
        .hung_polls
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if hang {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }

    let next = {
        let mut polls = backend.polls.lock().unwrap();
        if polls.len() > 1 {
            polls.pop_front()
        } else {
            polls.front().cloned()
        }
    };

    match next {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("Job {job_id} not found") })),
        )
            .into_response(),
    }
}

async fn cancel_job(State(backend): State<Arc<StubBackend>>) -> Json<Value> {
    backend.cancel_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "ok": true }))
}

async fn download(
    State(backend): State<Arc<StubBackend>>,
    UrlPath((job_id, kind)): UrlPath<(String, String)>,
) -> Response {
    backend.download_hits.fetch_add(1, Ordering::SeqCst);
    if kind == "missing" {
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    }
    format!("{job_id}:{kind}").into_response()
}
