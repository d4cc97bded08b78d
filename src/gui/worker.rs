// src/gui/worker.rs
//
// Background thread that drives a Run one batch at a time.
// The UI writes the requested status into `control`; the worker reads it
// between batches and publishes a Snapshot after every step.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use eframe::egui;

use crate::config::options::AppOptions;
use crate::core::net::HttpClient;
use crate::discovery::SearchClient;
use crate::policy::PolicyTable;
use crate::runner::{Run, Services, StepOutcome};
use crate::store::RunStatus;

use super::progress::GuiProgress;

const PAUSE_POLL: Duration = Duration::from_millis(200);

pub fn encode(status: RunStatus) -> u8 {
    match status {
        RunStatus::Initialized => 0,
        RunStatus::Running     => 1,
        RunStatus::Paused      => 2,
        RunStatus::Cancelled   => 3,
        RunStatus::Complete    => 4,
    }
}

pub fn decode(v: u8) -> RunStatus {
    match v {
        1 => RunStatus::Running,
        2 => RunStatus::Paused,
        3 => RunStatus::Cancelled,
        4 => RunStatus::Complete,
        _ => RunStatus::Initialized,
    }
}

/// What the dashboard shows about the active run.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub run_id: String,
    pub status: RunStatus,
    pub completed: usize,
    pub total: usize,
    pub fraction: f64,
    pub batch_line: String,
    pub errors: Vec<String>,
    pub table: PolicyTable,
    pub finished: bool,
}

impl Snapshot {
    fn from_run(run: &Run, errors: Vec<String>, table: PolicyTable) -> Self {
        Self {
            run_id: s!(run.run_id()),
            status: run.status(),
            completed: run.state.completed_brands.len(),
            total: run.brands.len(),
            fraction: run.progress_fraction(),
            batch_line: String::new(),
            errors,
            table,
            finished: false,
        }
    }
}

pub struct WorkerHandles {
    pub control: Arc<AtomicU8>,
    pub snapshot: Arc<Mutex<Snapshot>>,
    pub status: Arc<Mutex<String>>,
}

fn set(status: &Mutex<String>, msg: impl Into<String>) {
    if let Ok(mut s) = status.lock() {
        *s = msg.into();
    }
}

fn publish(snapshot: &Mutex<Snapshot>, update: impl FnOnce(&mut Snapshot)) {
    if let Ok(mut snap) = snapshot.lock() {
        update(&mut snap);
    }
}

/// Spawn the run thread. Returns immediately.
pub fn spawn(
    brands: Vec<String>,
    run_id: String,
    options: AppOptions,
    handles: &WorkerHandles,
    ctx: egui::Context,
) -> JoinHandle<()> {
    let control = Arc::clone(&handles.control);
    let snapshot = Arc::clone(&handles.snapshot);
    let status = Arc::clone(&handles.status);

    thread::spawn(move || {
        if let Err(e) = drive(brands, &run_id, options, &control, &snapshot, &status, &ctx) {
            loge!("Worker: run {run_id} stopped: {e}");
            set(&status, format!("Error: {e}"));
        }
        publish(&snapshot, |s| s.finished = true);
        ctx.request_repaint();
    })
}

fn drive(
    brands: Vec<String>,
    run_id: &str,
    options: AppOptions,
    control: &AtomicU8,
    snapshot: &Arc<Mutex<Snapshot>>,
    status: &Arc<Mutex<String>>,
    ctx: &egui::Context,
) -> Result<(), Box<dyn std::error::Error>> {
    let http = HttpClient::new(&options.research.user_agent)?;
    let search = SearchClient::from_env(http.clone(), options.research.request_delay);
    let services = Services { discovery: &search, fetcher: &http };

    let root = options.research.runs_root.clone();
    let mut run = Run::open(&root, run_id, brands, options)?;
    let (table, _) = run.refresh_outputs()?;
    let mut errors = Vec::new();
    publish(snapshot, |s| *s = Snapshot::from_run(&run, errors.clone(), table));
    ctx.request_repaint();

    let mut progress = GuiProgress::new(Arc::clone(status), Arc::clone(snapshot), ctx.clone());

    loop {
        let wanted = decode(control.load(Ordering::Relaxed));
        if wanted != run.status() {
            match wanted {
                RunStatus::Running => run.resume()?,
                RunStatus::Paused => run.pause()?,
                RunStatus::Cancelled => run.cancel()?,
                _ => {}
            }
        }

        if run.status() == RunStatus::Paused {
            publish(snapshot, |s| s.status = RunStatus::Paused);
            thread::sleep(PAUSE_POLL);
            continue;
        }

        let outcome = run.step(services, Some(&mut progress))?;
        errors = run.last_errors.clone();
        let table = run.policy_table();
        publish(snapshot, |s| {
            let line = std::mem::take(&mut s.batch_line);
            *s = Snapshot::from_run(&run, errors.clone(), table);
            s.batch_line = line;
        });
        ctx.request_repaint();

        match outcome {
            StepOutcome::Batch { number, brands, .. } => {
                logf!("Worker: batch {number} finished ({} brands)", brands.len());
            }
            StepOutcome::Complete => {
                control.store(encode(RunStatus::Complete), Ordering::Relaxed);
                set(status, format!("Run {} complete", run.run_id()));
                return Ok(());
            }
            StepOutcome::Cancelled => {
                set(status, "Run cancelled.");
                return Ok(());
            }
            StepOutcome::Idle => thread::sleep(PAUSE_POLL),
        }
    }
}
