// src/gui/components/brand_panel.rs
//
// Left panel: brand list file + the loaded brands, completed ones ticked.

use std::collections::HashSet;

use eframe::egui;
use crate::gui::{actions, app::App};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Brands");

    ui.label("Brand list (.csv or .xlsx with a 'brand' column):");
    ui.add(
        egui::TextEdit::singleline(&mut app.state.gui.brands_path)
            .font(egui::TextStyle::Monospace),
    );
    ui.horizontal(|ui| {
        let load = ui.add_enabled(!app.running(), egui::Button::new("Load"));
        if load.clicked() {
            actions::load_brands(app);
            logf!("UI: Loaded brands from {}", app.state.gui.brands_path);
        }
        ui.label(format!("Loaded {} brands", app.brands.len()));
    });

    ui.separator();

    // Match the scroll bar aesthetics used in the main table
    {
        let s = &mut ui.style_mut().spacing.scroll;
        s.floating = false;
        s.bar_width = 10.0;
        s.bar_inner_margin = 0.0;
        s.bar_outer_margin = -6.0;
        s.handle_min_length = 48.0;
        s.foreground_color = true;
        let visuals = &mut ui.style_mut().visuals;
        visuals.extreme_bg_color = visuals.panel_fill;
    }

    // completed count from the run; names from the brand order
    let done: HashSet<&str> = app
        .brands
        .iter()
        .take(app.view.completed)
        .map(String::as_str)
        .collect();

    egui::ScrollArea::vertical()
        .id_salt("brands_panel_scroll")
        .show(ui, |ui| {
            let w = ui.available_width();
            ui.set_min_width(w);
            for brand in &app.brands {
                let mark = if done.contains(brand.as_str()) { "✔ " } else { "   " };
                ui.label(format!("{mark}{brand}"));
            }
        });
}
