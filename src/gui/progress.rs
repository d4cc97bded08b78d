// src/gui/progress.rs
use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::progress::Progress;

use super::worker::Snapshot;

pub struct GuiProgress {
    status: Arc<Mutex<String>>,
    snapshot: Arc<Mutex<Snapshot>>,
    ctx: egui::Context,
    done: usize,
    total: usize,
}

impl GuiProgress {
    pub fn new(status: Arc<Mutex<String>>, snapshot: Arc<Mutex<Snapshot>>, ctx: egui::Context) -> Self {
        Self { status, snapshot, ctx, done: 0, total: 0 }
    }
    fn set_status(&self, msg: impl Into<String>) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
        self.ctx.request_repaint();
    }
}

impl Progress for GuiProgress {
    fn begin(&mut self, batch_number: usize, brands: &[String]) {
        self.done = 0;
        self.total = brands.len();
        let line = format!("Processing batch {} with brands: {}", batch_number, brands.join(", "));
        if let Ok(mut snap) = self.snapshot.lock() {
            snap.batch_line = line.clone();
        }
        self.set_status(line);
    }
    fn log(&mut self, msg: &str) {
        self.set_status(s!(msg));
    }
    fn item_done(&mut self, brand: &str) {
        self.done += 1;
        self.set_status(format!("Researched {} ({}/{})", brand, self.done, self.total));
    }
    fn item_failed(&mut self, msg: &str) {
        if let Ok(mut snap) = self.snapshot.lock() {
            snap.errors.push(s!(msg));
        }
        self.ctx.request_repaint();
    }
    fn finish(&mut self) {
        if self.total == 0 {
            self.set_status(s!("Batch complete"));
        } else {
            self.set_status(format!("Batch complete ({}/{})", self.done, self.total));
        }
    }
}
