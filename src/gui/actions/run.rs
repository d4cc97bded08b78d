// src/gui/actions/run.rs
//
// Start / Pause / Resume / Cancel. The worker picks up the requested
// status between batches; only Start spawns it.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use eframe::egui;

use crate::{
    brands::read_brands,
    gui::{app::App, worker},
    store::{self, RunStatus},
};

pub fn load_brands(app: &mut App) {
    let path = PathBuf::from(app.state.gui.brands_path.trim());
    match read_brands(&path, app.state.options.research.max_brands) {
        Ok(brands) => {
            app.status(format!("Loaded {} brands", brands.len()));
            app.brands = brands;
        }
        Err(e) => {
            loge!("Brands: {}: {e}", path.display());
            app.status(format!("Error: {e}"));
        }
    }
}

fn request(app: &App, status: RunStatus) {
    app.handles.control.store(worker::encode(status), Ordering::Relaxed);
    logf!("UI: requested {}", status.as_str());
}

pub fn start(app: &mut App, ctx: &egui::Context) {
    if app.brands.is_empty() {
        app.status("Load a brand list first");
        return;
    }
    request(app, RunStatus::Running);
    if app.running() {
        return;
    }

    let run_id = app.run_id.get_or_insert_with(store::new_run_id).clone();
    app.status(format!("Starting run {run_id}"));
    let handle = worker::spawn(
        app.brands.clone(),
        run_id,
        app.state.options.clone(),
        &app.handles,
        ctx.clone(),
    );
    app.worker = Some(handle);
}

pub fn pause(app: &mut App) {
    request(app, RunStatus::Paused);
    app.status("Pausing after the current batch");
}

pub fn resume(app: &mut App, ctx: &egui::Context) {
    // a finished worker (cancelled, errored) needs a fresh thread
    start(app, ctx);
}

pub fn cancel(app: &mut App) {
    request(app, RunStatus::Cancelled);
    if app.running() {
        app.status("Cancelling after the current batch");
    } else if let Some(id) = &app.run_id {
        // no worker: persist the cancel directly
        let paths = store::RunPaths::new(&app.state.options.research.runs_root, id);
        if let Ok(Some(mut p)) = store::load_progress(&paths) {
            p.status = RunStatus::Cancelled;
            if let Err(e) = store::save_progress(&paths, &mut p) {
                loge!("Cancel: {e}");
            }
            app.view.status = RunStatus::Cancelled;
        }
        app.status("Run cancelled.");
    }
}

/// Forget the current run id; the next Start opens a fresh run.
pub fn new_run(app: &mut App) {
    if app.running() {
        app.status("Pause or cancel the current run first");
        return;
    }
    app.run_id = None;
    app.view = worker::Snapshot::default();
    app.summary = Default::default();
    app.status("Next Start opens a new run");
}
