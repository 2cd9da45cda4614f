//! `docsort` -- command-line client for the document-classifier service.
//!
//! Uploads PDFs, follows the created job until it finishes and lists (or
//! saves) the produced artifacts.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                 | Description                     |
//! |--------------------------------|----------|-------------------------|---------------------------------|
//! | `DOCSORT_BASE_URL`             | no       | `http://localhost:8000` | Backend base URL                |
//! | `DOCSORT_POLL_INTERVAL_MS`     | no       | `1200`                  | Milliseconds between polls      |
//! | `DOCSORT_REQUEST_TIMEOUT_SECS` | no       | --                      | Per-request timeout             |
//! | `DOCSORT_POLL_TIMEOUT_MS`      | no       | `10000`                 | Deadline for one status request |
//! | `DOCSORT_DPI`                  | no       | `150`                   | Page rendering resolution       |
//! | `DOCSORT_SLEEP_SEC`            | no       | `3`                     | Backend delay between pages     |
//! | `DOCSORT_MODEL`                | no       | Llama 4 Scout           | Classifier model identifier     |

mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use docsort_client::api::JobApi;
use docsort_client::config::ClientConfig;
use docsort_client::poller::{PollController, PollTask};
use docsort_client::session::JobSession;
use docsort_core::job::JobStatus;
use docsort_core::options::ProcessingOptions;
use docsort_core::types::JobId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terminal::TerminalView;

#[derive(Parser)]
#[command(name = "docsort", version, about = "Receipt / credit-note classifier client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload PDFs and follow the job until it finishes.
    Submit {
        /// PDF files to classify.
        files: Vec<PathBuf>,
        #[command(flatten)]
        overrides: OptionOverrides,
        /// Save every produced artifact into this directory.
        #[arg(long)]
        download_dir: Option<PathBuf>,
    },
    /// Follow an existing job until it finishes.
    Watch {
        job_id: String,
        /// Save every produced artifact into this directory.
        #[arg(long)]
        download_dir: Option<PathBuf>,
    },
    /// Print the current status of a job as JSON.
    Status { job_id: String },
    /// Ask the backend to cancel a job.
    Cancel { job_id: String },
}

/// Command-line overrides for the configured processing options.
#[derive(Args)]
struct OptionOverrides {
    /// Page rendering resolution.
    #[arg(long)]
    dpi: Option<u32>,
    /// Seconds the backend waits between pages.
    #[arg(long)]
    sleep_sec: Option<f64>,
    /// Classifier model identifier.
    #[arg(long)]
    model: Option<String>,
}

impl OptionOverrides {
    fn apply(self, mut options: ProcessingOptions) -> ProcessingOptions {
        if let Some(dpi) = self.dpi {
            options.dpi = dpi;
        }
        if let Some(sleep_sec) = self.sleep_sec {
            options.sleep_sec = sleep_sec;
        }
        if let Some(model) = self.model {
            options.model = model;
        }
        options
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsort=info,docsort_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "docsort failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run one subcommand. `Ok(false)` means the job did not finish `done`.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = ClientConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        base_url = %config.base_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Loaded client configuration",
    );
    let api = JobApi::new(config.clone()).context("failed to build HTTP client")?;

    match cli.command {
        Command::Submit {
            files,
            overrides,
            download_dir,
        } => {
            let options = overrides.apply(config.options.clone());
            let mut session = JobSession::new(api, TerminalView::new());
            session.select_files(&files);
            if session.submit_with(&files, &options).await.is_err() {
                return Ok(false);
            }
            follow(session, download_dir).await
        }
        Command::Watch {
            job_id,
            download_dir,
        } => {
            let mut session = JobSession::new(api, TerminalView::new());
            session.attach(JobId::new(job_id)?)?;
            follow(session, download_dir).await
        }
        Command::Status { job_id } => {
            let snapshot = api.get_job(&JobId::new(job_id)?).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(true)
        }
        Command::Cancel { job_id } => {
            let job_id = JobId::new(job_id)?;
            api.cancel_job(&job_id).await?;
            println!("Cancellation requested for job {job_id}.");
            Ok(true)
        }
    }
}

/// Poll until the job finishes, then optionally save its artifacts.
async fn follow(
    session: JobSession<TerminalView>,
    download_dir: Option<PathBuf>,
) -> anyhow::Result<bool> {
    let task = PollTask::start(session);
    let ctrl_c = tokio::spawn(forward_ctrl_c(task.controller()));

    let mut session = task.join().await?;
    ctrl_c.abort();

    let done = session.view().state().status == JobStatus::Done;
    if done {
        if let Some(dir) = download_dir {
            let saved = session.download_artifacts(&dir).await?;
            tracing::info!(count = saved.len(), dir = %dir.display(), "Artifacts saved");
        }
    }
    Ok(done)
}

/// First Ctrl-C asks the backend to cancel; the second stops polling.
async fn forward_ctrl_c(controller: PollController) {
    let mut presses = 0u32;
    while tokio::signal::ctrl_c().await.is_ok() {
        presses += 1;
        if presses == 1 {
            eprintln!("Requesting cancellation (press Ctrl-C again to stop watching)…");
            if !controller.request_cancel() {
                controller.stop();
                return;
            }
        } else {
            controller.stop();
            return;
        }
    }
}
