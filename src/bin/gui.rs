// src/bin/gui.rs
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]
use discount_research::{config::state::GuiState, gui};
use eframe::egui::{IconData, ViewportBuilder};
use image::{Rgba, RgbaImage};

const ICON_SIZE: u32 = 64;

/// Price-tag glyph: a dark rounded square with a diagonal red sale stripe.
fn app_icon() -> IconData {
    let n = ICON_SIZE as i32;
    let rgba = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let (x, y) = (x as i32, y as i32);
        let corner = 10;
        let cx = x.clamp(corner, n - 1 - corner);
        let cy = y.clamp(corner, n - 1 - corner);
        let outside = (x - cx).pow(2) + (y - cy).pow(2) > corner * corner;
        if outside {
            return Rgba([0, 0, 0, 0]);
        }
        if (x + y - n).abs() < 9 {
            Rgba([220, 30, 30, 255])
        } else {
            Rgba([32, 36, 44, 255])
        }
    });
    let (w, h) = rgba.dimensions();
    IconData { rgba: rgba.into_raw(), width: w, height: h }
}

fn main() {
    let gui_state = GuiState::default();
    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([gui_state.window_w as f32, gui_state.window_h as f32])
            .with_icon(app_icon()),
        ..Default::default()
    };

    if let Err(e) = gui::run(options) {
        eprintln!("GUI failed: {}", e);
        std::process::exit(1);
    }
}
