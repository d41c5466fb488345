//! Single-worker front door: one run at a time per generator instance.
//!
//! State machine: `Idle -> Running -> {Completed | Failed | Cancelled}`.
//! A terminal state may start again; `Running` rejects `start` with
//! [`GenError::AlreadyRunning`].

use crossbeam_channel::{unbounded, Receiver};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::cancel::CancelToken;
use crate::error::GenError;
use crate::generate;
use crate::progress::{Event, Outcome};
use crate::request::RunRequest;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => RunState::Running,
            2 => RunState::Completed,
            3 => RunState::Failed,
            4 => RunState::Cancelled,
            _ => RunState::Idle,
        }
    }

    fn of(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Completed { .. } => RunState::Completed,
            Outcome::Failed { .. } => RunState::Failed,
            Outcome::Cancelled { .. } => RunState::Cancelled,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed | RunState::Cancelled)
    }
}

#[derive(Clone, Debug)]
pub struct ManifestGenerator {
    state: Arc<AtomicU8>,
}

impl Default for ManifestGenerator {
    fn default() -> Self {
        Self { state: Arc::new(AtomicU8::new(RunState::Idle as u8)) }
    }
}

impl ManifestGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Validate `req` and start the run on a dedicated worker thread.
    ///
    /// Invalid arguments are reported here, before any file is touched, and
    /// leave the state unchanged.
    pub fn start(&self, req: &RunRequest) -> Result<RunHandle, GenError> {
        let job = req.validate()?;
        self.enter_running()?;

        let (tx, rx) = unbounded();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let state = Arc::clone(&self.state);
        let handle_state = Arc::clone(&self.state);
        let worker_job = job.clone();
        let spawned = thread::Builder::new().name("verhash-worker".into()).spawn(move || {
            generate::run_then(&worker_job, &tx, &worker_cancel, |outcome| {
                state.store(RunState::of(outcome) as u8, Ordering::Release);
            })
        });
        let worker = match spawned {
            Ok(h) => h,
            Err(e) => {
                self.state.store(RunState::Failed as u8, Ordering::Release);
                return Err(GenError::io(&job.output, e));
            }
        };
        Ok(RunHandle { events: rx, cancel, output: job.output, state: handle_state, worker })
    }

    /// Request cancellation of `handle`'s run. Takes effect at the next file boundary.
    pub fn cancel(&self, handle: &RunHandle) {
        handle.cancel();
    }

    /// Start, forward every event to `on_event` in order, and wait for the worker.
    pub fn run_to_completion(
        &self,
        req: &RunRequest,
        mut on_event: impl FnMut(&Event),
    ) -> Result<Outcome, GenError> {
        let handle = self.start(req)?;
        for ev in handle.events().iter() {
            on_event(&ev);
            if ev.is_terminal() {
                break;
            }
        }
        Ok(handle.wait())
    }

    fn enter_running(&self) -> Result<(), GenError> {
        let mut cur = self.state.load(Ordering::Acquire);
        loop {
            if RunState::from_u8(cur) == RunState::Running {
                return Err(GenError::AlreadyRunning);
            }
            match self.state.compare_exchange(
                cur,
                RunState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => cur = actual,
            }
        }
    }
}

/// Handle to one in-flight run.
pub struct RunHandle {
    events: Receiver<Event>,
    cancel: CancelToken,
    output: PathBuf,
    state: Arc<AtomicU8>,
    worker: JoinHandle<Outcome>,
}

impl RunHandle {
    /// The run's event stream. Disconnects after the terminal event.
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Manifest path; do not read or move it before a terminal event.
    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the worker exits.
    pub fn wait(self) -> Outcome {
        match self.worker.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                self.state.store(RunState::Failed as u8, Ordering::Release);
                Outcome::Failed { message: "manifest worker panicked".to_string() }
            }
        }
    }
}
