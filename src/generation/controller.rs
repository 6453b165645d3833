//! Generation controller: submit a job, then poll it to a terminal state.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::api::{Api, ApiError, GenerationJob, JobStatus, SubmitRequest};

use super::request::{ValidationError, validate_request};

/// Polling cadence used by the service's web client.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

const GENERIC_FAILURE: &str = "Generation failed";

/// Errors that can occur while driving a generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("A generation is already in progress")]
    Busy,

    #[error("No generation is in progress")]
    NotRunning,

    #[error("Polling task stopped unexpectedly")]
    TaskLost,

    #[error("Failed to start polling: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Polling { job_id: String },
}

/// Events emitted by the polling task, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// Non-terminal status observed on a tick.
    Status(GenerationJob),
    Completed(GenerationJob),
    Failed(String),
    Cancelled,
}

/// How a generation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(GenerationJob),
    Failed(String),
    Cancelled,
}

/// Control messages for a polling task.
#[derive(Debug, Clone, Copy)]
enum Signal {
    /// Stop polling and cancel the job remotely.
    Cancel,
    /// Stop polling only.
    Stop,
}

/// Signal that cancels an active polling task from another thread.
///
/// Cancelling this way also asks the service to cancel the job.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Sender<Signal>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // A closed channel means the task already finished.
        let _ = self.tx.send(Signal::Cancel);
    }
}

struct PollingTask {
    job_id: String,
    signals: Sender<Signal>,
    events: Receiver<GenerationEvent>,
    handle: JoinHandle<()>,
}

impl PollingTask {
    /// Signal the task, join it, and hand back whatever it emitted.
    fn stop(self, signal: Signal) -> Receiver<GenerationEvent> {
        // A closed channel means the task already finished.
        let _ = self.signals.send(signal);
        if self.handle.join().is_err() {
            tracing::error!(job_id = %self.job_id, "polling task panicked");
        }
        self.events
    }
}

/// The outcome a terminal event stands for.
fn terminal_outcome(event: GenerationEvent) -> Option<GenerationOutcome> {
    match event {
        GenerationEvent::Status(_) => None,
        GenerationEvent::Completed(job) => Some(GenerationOutcome::Completed(job)),
        GenerationEvent::Failed(message) => Some(GenerationOutcome::Failed(message)),
        GenerationEvent::Cancelled => Some(GenerationOutcome::Cancelled),
    }
}

/// Drives one generation at a time.
///
/// At most one polling task is alive per controller. Dropping the
/// controller stops polling without contacting the service.
pub struct GenerationController<A: Api + 'static> {
    api: Arc<A>,
    interval: Duration,
    active: Option<PollingTask>,
}

impl<A: Api + 'static> GenerationController<A> {
    /// Create a controller polling at the default two-second cadence.
    pub fn new(api: Arc<A>) -> Self {
        Self::with_interval(api, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(api: Arc<A>, interval: Duration) -> Self {
        Self {
            api,
            interval,
            active: None,
        }
    }

    pub fn state(&self) -> GenerationState {
        match &self.active {
            Some(task) => GenerationState::Polling {
                job_id: task.job_id.clone(),
            },
            None => GenerationState::Idle,
        }
    }

    /// True while a job is being polled; new submissions are refused.
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        self.active.as_ref().map(|task| CancelHandle {
            tx: task.signals.clone(),
        })
    }

    /// Validate raw input and submit it. Invalid input never reaches the API.
    pub fn generate(
        &mut self,
        text: &str,
        voice_id: Option<&str>,
        language: Option<&str>,
    ) -> Result<GenerationJob, GenerationError> {
        if self.is_busy() {
            return Err(GenerationError::Busy);
        }
        let request = validate_request(text, voice_id, language)?;
        self.submit(&request)
    }

    /// Submit a job and start polling it.
    pub fn submit(&mut self, request: &SubmitRequest) -> Result<GenerationJob, GenerationError> {
        if self.is_busy() {
            return Err(GenerationError::Busy);
        }

        let job = self.api.submit(request)?;
        tracing::info!(job_id = %job.id, status = job.status.as_str(), "generation submitted");

        let (signals, signal_rx) = mpsc::channel();
        let (events_tx, events) = mpsc::channel();
        let api = Arc::clone(&self.api);
        let job_id = job.id.clone();
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("generation-poll".to_string())
            .spawn(move || poll_job(&*api, &job_id, interval, signal_rx, events_tx))?;

        self.active = Some(PollingTask {
            job_id: job.id.clone(),
            signals,
            events,
            handle,
        });

        Ok(job)
    }

    /// Block until the active job ends, passing every event to `listener`.
    ///
    /// When `timeout` elapses first the job is cancelled.
    pub fn wait(
        &mut self,
        timeout: Option<Duration>,
        mut listener: impl FnMut(&GenerationEvent),
    ) -> Result<GenerationOutcome, GenerationError> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let task = self.active.as_ref().ok_or(GenerationError::NotRunning)?;

            let received = match deadline {
                Some(deadline) => task
                    .events
                    .recv_timeout(deadline.saturating_duration_since(Instant::now())),
                None => task.events.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            let event = match received {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::info!(job_id = %task.job_id, "generation timed out");
                    return Ok(self.cancel_after_timeout(&mut listener));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.finish();
                    return Err(GenerationError::TaskLost);
                }
            };

            listener(&event);

            if let Some(outcome) = terminal_outcome(event) {
                self.finish();
                return Ok(outcome);
            }
        }
    }

    /// Cancel once the deadline has passed.
    ///
    /// A job that ended while the cancel was in flight keeps its real outcome.
    fn cancel_after_timeout(
        &mut self,
        listener: &mut impl FnMut(&GenerationEvent),
    ) -> GenerationOutcome {
        let Some(task) = self.active.take() else {
            return GenerationOutcome::Cancelled;
        };

        let events = task.stop(Signal::Cancel);
        for event in events.try_iter() {
            listener(&event);
            if let Some(outcome) = terminal_outcome(event) {
                return outcome;
            }
        }

        listener(&GenerationEvent::Cancelled);
        GenerationOutcome::Cancelled
    }

    /// Stop polling and ask the service to cancel the job.
    ///
    /// Local state is cleared whether or not the remote cancel succeeds.
    pub fn cancel(&mut self) {
        if let Some(task) = self.active.take() {
            task.stop(Signal::Cancel);
        }
    }

    fn finish(&mut self) {
        if let Some(task) = self.active.take() {
            task.stop(Signal::Stop);
        }
    }
}

impl<A: Api + 'static> Drop for GenerationController<A> {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Polling loop run on the task thread.
///
/// A cancel signal also cancels the job remotely; a stop signal or a
/// closed channel only ends the loop.
fn poll_job<A: Api + ?Sized>(
    api: &A,
    job_id: &str,
    interval: Duration,
    signals: Receiver<Signal>,
    events: Sender<GenerationEvent>,
) {
    loop {
        match signals.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(Signal::Cancel) => {
                let _ = events.send(GenerationEvent::Cancelled);
                if let Err(e) = api.cancel(job_id) {
                    tracing::warn!(job_id, error = %e, "cancel failed");
                }
                return;
            }
            Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!(job_id, "polling stopped");
                return;
            }
        }

        let job = match api.status(job_id) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(job_id, error = %e, "status check failed");
                continue;
            }
        };
        tracing::debug!(job_id, status = job.status.as_str(), "status polled");

        let event = match job.status {
            JobStatus::Completed => GenerationEvent::Completed(job),
            JobStatus::Failed => {
                GenerationEvent::Failed(job.error.unwrap_or_else(|| GENERIC_FAILURE.to_string()))
            }
            JobStatus::Pending | JobStatus::Processing => GenerationEvent::Status(job),
        };
        let terminal = !matches!(event, GenerationEvent::Status(_));

        if events.send(event).is_err() || terminal {
            return;
        }
    }
}
