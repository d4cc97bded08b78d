// src/config/state.rs
use super::options::AppOptions;

#[derive(Clone, Debug)]
pub struct GuiState {
    /// Brand list file typed into the left panel
    pub brands_path: String,

    pub window_w: u32,
    pub window_h: u32,

    /// Show the raw counters under the progress bar
    pub show_debug: bool,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            brands_path: s!("brands.csv"),
            window_w: 1200,
            window_h: 760,
            show_debug: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub options: AppOptions,
    pub gui: GuiState,
}
