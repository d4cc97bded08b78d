// src/config/mod.rs
pub mod consts;
pub mod loader;
pub mod options;
pub mod state;

pub use loader::load_options;
pub use options::{AppOptions, ExportFormat, ExportOptions, ResearchOptions};
