// src/gui/components/controls.rs

use eframe::egui::{self, widgets::Spinner};
use crate::gui::{actions, app::App};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let ctx = ui.ctx().clone();

    // Search API banner
    let (msg, configured) = app.api_status.clone();
    if configured {
        ui.label(egui::RichText::new(msg).color(egui::Color32::from_rgb(0x64, 0xB4, 0xFF)));
    } else {
        ui.label(egui::RichText::new(msg).color(egui::Color32::from_rgb(0xF0, 0xD2, 0x3C)));
    }

    ui.horizontal(|ui| {
        let can_start = !app.brands.is_empty();
        if ui.add_enabled(can_start, egui::Button::new("Start")).clicked() {
            actions::start(app, &ctx);
        }
        if ui.button("Pause").clicked() {
            actions::pause(app);
        }
        if ui.add_enabled(can_start, egui::Button::new("Resume")).clicked() {
            actions::resume(app, &ctx);
        }
        if ui.button("Cancel").clicked() {
            actions::cancel(app);
        }
        ui.separator();
        if ui.add_enabled(!app.running(), egui::Button::new("New run")).clicked() {
            actions::new_run(app);
        }
        if app.running() {
            ui.add(Spinner::new());
        }
    });

    let view = &app.view;
    ui.add(
        egui::ProgressBar::new(view.fraction as f32)
            .show_percentage()
            .desired_width(ui.available_width()),
    );

    ui.horizontal(|ui| {
        if let Some(id) = &app.run_id {
            ui.monospace(format!("run {id}"));
            ui.separator();
        }
        ui.label(format!("Completed {} of {} brands", view.completed, view.total));
        let remaining = view.total.saturating_sub(view.completed);
        if remaining > 0 {
            ui.label(format!("Remaining: {remaining}"));
        }
    });
    if !view.batch_line.is_empty() {
        ui.label(&view.batch_line);
    }
    ui.label(app.status_text());

    ui.checkbox(&mut app.state.gui.show_debug, "Show debug");
    if app.state.gui.show_debug {
        let view = &app.view;
        ui.monospace(format!(
            "total_brands={} completed_brands={} remaining_brands={} progress_value={:.3} run_status={}",
            view.total,
            view.completed,
            view.total.saturating_sub(view.completed),
            view.fraction,
            view.status.as_str()
        ));
    }
}
