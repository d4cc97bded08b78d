// src/gui/actions/export.rs
use std::path::PathBuf;

use crate::{
    file,
    gui::app::App,
    store::RunPaths,
};

/// Write the current table into the run folder (and the export folder, if set).
pub fn export(app: &mut App) {
    // text field → options first, before any &app borrows
    let dir = app.out_dir_text.trim();
    app.state.options.export.out_dir = if dir.is_empty() {
        None
    } else {
        Some(PathBuf::from(file::normalize_separators(dir)))
    };

    if app.table().is_empty() {
        logd!("Export: Clicked, but there's nothing to export");
        app.status("Nothing to export");
        return;
    }
    let Some(run_id) = app.run_id.clone() else {
        app.status("Nothing to export (no run yet)");
        return;
    };

    let paths = RunPaths::new(&app.state.options.research.runs_root, &run_id);
    let export = &app.state.options.export;
    logf!(
        "Export: Begin run={}, rows={}, format={:?}, out_dir={:?}",
        run_id,
        app.table().len(),
        export.format,
        export.out_dir
    );

    let msg = match file::export_run_outputs(&paths, app.table(), export) {
        Ok(written) => {
            let last = written.last().map(|p| p.display().to_string()).unwrap_or_default();
            logf!("Export: OK count={} last={}", written.len(), last);
            format!("Exported {} file(s). Last: {}", written.len(), last)
        }
        Err(e) => {
            loge!("Export: Error: {e}");
            format!("Failed to write output files: {e}")
        }
    };
    app.status(msg);
}
