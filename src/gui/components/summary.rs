// src/gui/components/summary.rs
//
// Stats line + the last few search/scrape errors.

use eframe::egui;
use crate::gui::app::App;

const RECENT_ERRORS: usize = 10;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let s = &app.summary;
    ui.horizontal(|ui| {
        ui.strong("Stats");
        ui.separator();
        ui.label(format!("OBSERVED rows: {}", s.observed_rows));
        ui.separator();
        ui.label(format!("INFERRED rows: {}", s.inferred_rows));
        ui.separator();
        ui.label(format!("Average sale pct: {}", s.avg_sale_pct));
    });

    let errors = &app.view.errors;
    if errors.is_empty() {
        return;
    }
    egui::CollapsingHeader::new(format!("Recent errors (search/scrape): {}", errors.len()))
        .default_open(false)
        .show(ui, |ui| {
            let start = errors.len().saturating_sub(RECENT_ERRORS);
            for e in &errors[start..] {
                ui.label(egui::RichText::new(e).color(egui::Color32::from_rgb(0xDC, 0x61, 0x49)));
            }
        });
}
