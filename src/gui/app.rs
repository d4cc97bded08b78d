// src/gui/app.rs
use std::{
    error::Error,
    path::Path,
    sync::{atomic::AtomicU8, Arc, Mutex},
    thread::JoinHandle,
};

use eframe::egui;

use crate::{
    config::{consts::RUNS_DIR, loader::load_options, state::AppState},
    discovery::search_api_status,
    policy::{PolicySummary, PolicyTable},
    store::{self, RunPaths, RunStatus},
};

use super::worker::{encode, Snapshot, WorkerHandles};

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    crate::log::init(Path::new(RUNS_DIR));

    let mut state = AppState::default();
    match load_options(Path::new(".")) {
        Ok(opts) => state.options = opts,
        Err(e) => loge!("Config: {e}; using defaults"),
    }

    eframe::run_native(
        "LFY US Discount Researcher",
        options,
        Box::new(move |_cc| Ok(Box::new(App::new(state)))),
    )?;
    Ok(())
}

pub struct App {
    // single source of truth (UI thread only)
    pub state: AppState,

    pub brands: Vec<String>,
    /// Run the Start button resumes; latest on-disk run at launch.
    pub run_id: Option<String>,
    pub api_status: (String, bool),

    // output folder text field (mapped onto ExportOptions.out_dir)
    pub out_dir_text: String,

    // shared with the worker thread
    pub handles: WorkerHandles,
    pub worker: Option<JoinHandle<()>>,

    // last snapshot pulled from the worker, read by the components
    pub view: Snapshot,
    pub summary: PolicySummary,
}

impl App {
    pub fn new(state: AppState) -> Self {
        let root = state.options.research.runs_root.clone();
        let run_id = store::find_latest_run(&root);

        let mut view = Snapshot::default();
        let mut status = s!("Idle");
        if let Some(id) = &run_id {
            let paths = RunPaths::new(&root, id);
            if let Ok(Some(p)) = store::load_progress(&paths) {
                view.run_id = id.clone();
                view.status = p.status;
                view.completed = p.completed_brands.len();
                view.total = p.total_brands;
                view.fraction = crate::runner::calculate_progress(view.completed, view.total);
                view.errors = store::recent_errors(&paths, 10);
                status = format!("Latest run {id}: {}", p.status.as_str());
            }
        }

        let api_status = search_api_status();
        logf!("Init: runs_root={}, latest run={:?}, {}", root.display(), run_id, api_status.0);

        let out_dir_text = state.options.export.out_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            state,
            brands: Vec::new(),
            run_id,
            api_status,
            out_dir_text,
            handles: WorkerHandles {
                control: Arc::new(AtomicU8::new(encode(RunStatus::Initialized))),
                snapshot: Arc::new(Mutex::new(Snapshot::default())),
                status: Arc::new(Mutex::new(status)),
            },
            worker: None,
            view,
            summary: PolicySummary::default(),
        }
    }

    /* ---------- tiny helpers ---------- */

    #[inline]
    pub fn status<T: Into<String>>(&self, msg: T) {
        if let Ok(mut s) = self.handles.status.lock() {
            *s = msg.into();
        }
    }

    #[inline]
    pub fn status_text(&self) -> String {
        self.handles.status.lock().map(|s| s.clone()).unwrap_or_default()
    }

    #[inline]
    pub fn running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn table(&self) -> &PolicyTable { &self.view.table }

    /// Pull the worker's latest snapshot into `view`.
    fn sync_from_worker(&mut self) {
        if self.worker.is_none() {
            return;
        }
        if let Ok(snap) = self.handles.snapshot.lock() {
            if !snap.run_id.is_empty() {
                self.view = snap.clone();
            }
        }
        self.summary = self.view.table.summary();

        if self.worker.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(h) = self.worker.take() {
                let _ = h.join();
            }
            logd!("Worker: joined");
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_from_worker();

        egui::SidePanel::left("brands")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                super::components::brand_panel::draw(ui, self);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            super::components::controls::draw(ui, self);

            ui.separator();

            super::components::summary::draw(ui, self);

            ui.separator();

            super::components::export_bar::draw(ui, self);

            ui.separator();

            super::components::data_table::draw(ui, self);
        });

        if self.running() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}
