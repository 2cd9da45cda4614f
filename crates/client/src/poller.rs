//! Fixed-cadence status poll task.
//!
//! [`PollTask::start`] moves a [`JobSession`] into a tokio task that
//! polls the job status every `poll_interval` until the job reaches a
//! terminal state or the task is stopped. Requests are awaited inside
//! the loop, so at most one status request is in flight; ticks that
//! fall due while a request is outstanding are skipped rather than
//! queued. Each request is bounded by the configured poll timeout and
//! is abandoned as soon as the task is stopped. [`PollTask::join`]
//! hands the session back.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::session::JobSession;
use crate::view::JobView;

/// Capacity of the command channel into the poll task.
const COMMAND_CHANNEL_CAPACITY: usize = 8;

/// Requests that can be sent to a running poll task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    /// Send a cancellation request to the backend and keep polling.
    CancelJob,
}

/// Cloneable handle for steering a running poll task from elsewhere
/// (e.g. a Ctrl-C listener).
#[derive(Clone)]
pub struct PollController {
    commands: mpsc::Sender<PollCommand>,
    cancel: CancellationToken,
}

impl PollController {
    /// Queue a backend cancellation request. Returns `false` if the task
    /// has already exited or its queue is full.
    pub fn request_cancel(&self) -> bool {
        self.commands.try_send(PollCommand::CancelJob).is_ok()
    }

    /// Stop polling locally. The backend job is left untouched.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// A running poll loop that owns its session until joined.
pub struct PollTask<V> {
    controller: PollController,
    handle: JoinHandle<JobSession<V>>,
}

impl<V> PollTask<V>
where
    V: JobView + Send + 'static,
{
    /// Spawn the poll loop for `session`.
    ///
    /// The first request goes out one interval after the start, matching
    /// a recurring timer. A session with no job exits immediately.
    pub fn start(session: JobSession<V>) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move { run_poll_loop(session, rx, task_cancel).await });

        Self {
            controller: PollController {
                commands: tx,
                cancel,
            },
            handle,
        }
    }

    pub fn controller(&self) -> PollController {
        self.controller.clone()
    }

    pub fn request_cancel(&self) -> bool {
        self.controller.request_cancel()
    }

    pub fn stop(&self) {
        self.controller.stop();
    }

    /// Wait for the loop to exit and take the session back.
    pub async fn join(self) -> Result<JobSession<V>, ClientError> {
        self.handle
            .await
            .map_err(|e| ClientError::Task(e.to_string()))
    }
}

/// Core poll loop: tick -> poll -> apply, until terminal or stopped.
///
/// Every request races the cancellation token, so a stop takes effect
/// even while a request is outstanding. A cancel command that arrives
/// mid-request is sent once that request settles.
async fn run_poll_loop<V: JobView>(
    mut session: JobSession<V>,
    mut commands: mpsc::Receiver<PollCommand>,
    cancel: CancellationToken,
) -> JobSession<V> {
    if !session.is_active() {
        return session;
    }

    let period = session.api().config().poll_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let job_id = session.job_id().map(ToString::to_string).unwrap_or_default();
    tracing::debug!(job_id = %job_id, period_ms = period.as_millis() as u64, "Poll loop started");

    let mut cancel_pending = false;
    loop {
        if std::mem::take(&mut cancel_pending) {
            match until_stopped(&cancel, session.request_cancel()).await {
                None => {
                    session.stop_polling();
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Cancellation not sent");
                }
                Some(Ok(())) => {}
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                session.stop_polling();
                break;
            }
            Some(PollCommand::CancelJob) = commands.recv() => {
                cancel_pending = true;
                continue;
            }
            _ = ticker.tick() => {}
        }

        let outcome = {
            let poll = session.poll_once();
            tokio::pin!(poll);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break None,
                    Some(PollCommand::CancelJob) = commands.recv() => cancel_pending = true,
                    outcome = &mut poll => break Some(outcome),
                }
            }
        };

        match outcome {
            None => {
                tracing::debug!(job_id = %job_id, "Poll loop stopped mid-request");
                session.stop_polling();
                break;
            }
            Some(outcome) if outcome.ends_polling() => {
                tracing::debug!(job_id = %job_id, ?outcome, "Poll loop finished");
                break;
            }
            Some(_) => {}
        }
    }

    session
}

/// Drive `fut` unless `cancel` fires first.
async fn until_stopped<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}
