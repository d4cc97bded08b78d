// src/gui/components/data_table.rs
//
// Draws the live policy table. Purely a view.

use eframe::egui::{self, Align, Color32, Layout, RichText, TextWrapMode};
use egui_extras::{Column, TableBuilder};
use crate::gui::app::App;

/// Initial widths by canonical column.
const WIDTHS: [f32; 12] = [160.0, 60.0, 90.0, 60.0, 60.0, 60.0, 90.0, 120.0, 130.0, 80.0, 70.0, 220.0];

/// Percentage columns, drawn centered.
const NUMERIC: [usize; 3] = [3, 4, 5];

const EVIDENCE_COL: usize = 9;
const CONFIDENCE_COL: usize = 10;

fn tint(ci: usize, cell: &str) -> Option<Color32> {
    match (ci, cell) {
        (EVIDENCE_COL, "OBSERVED") => Some(Color32::from_rgb(0x64, 0xB4, 0xFF)),
        (CONFIDENCE_COL, "HIGH")   => Some(Color32::from_rgb(0x6A, 0xC4, 0x6A)),
        (CONFIDENCE_COL, "LOW")    => Some(Color32::from_rgb(0xF0, 0xD2, 0x3C)),
        _ => None,
    }
}

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let table = app.table();
    let headers = table.columns();
    let records = table.records();

    if records.is_empty() {
        ui.label("No policy rows yet. Load brands and press Start.");
        return;
    }

    // Ensure scroll bars allocate space (not floating over content)
    {
        let s = &mut ui.style_mut().spacing.scroll;
        s.floating = false;
        s.bar_width = 10.0;
        s.bar_inner_margin = 7.0;
        s.bar_outer_margin = 0.0;
        s.handle_min_length = 48.0;
        s.foreground_color = true;
        let visuals = &mut ui.style_mut().visuals;
        visuals.extreme_bg_color = visuals.panel_fill;
    }

    let avail_h = ui.available_height();
    egui::ScrollArea::new([true, false])
        .id_salt("policy_table_hscroll")
        .min_scrolled_height(avail_h)
        .max_height(avail_h)
        .show(ui, |ui| {
            let mut builder = TableBuilder::new(ui)
                .striped(true)
                .min_scrolled_height(0.0);
            for w in WIDTHS.iter().take(headers.len()) {
                builder = builder.column(Column::initial(*w).resizable(true).clip(true).at_least(20.0));
            }

            builder
                .header(24.0, |mut header| {
                    for (ci, name) in headers.iter().enumerate() {
                        header.col(|ui| {
                            ui.style_mut().wrap_mode = Some(TextWrapMode::Extend);
                            let label = RichText::new(*name).strong();
                            if NUMERIC.contains(&ci) {
                                ui.centered_and_justified(|ui| { ui.label(label); });
                            } else {
                                ui.label(label);
                            }
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, records.len(), |mut row| {
                        let Some(data) = records.get(row.index()) else { return };
                        for (ci, cell) in data.iter().enumerate() {
                            row.col(|ui| {
                                ui.style_mut().wrap_mode = Some(TextWrapMode::Extend);
                                let mut rt = RichText::new(cell);
                                if let Some(c) = tint(ci, cell) {
                                    rt = rt.color(c);
                                }
                                if NUMERIC.contains(&ci) {
                                    ui.centered_and_justified(|ui| { ui.label(rt); });
                                } else {
                                    ui.with_layout(Layout::left_to_right(Align::Center), |ui| { ui.label(rt); });
                                }
                            });
                        }
                    });
                });
        });
}
