// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct AppOptions {
    pub research: ResearchOptions,
    pub export: ExportOptions,
}

/// Knobs for discovery + scraping.
#[derive(Clone, Debug, PartialEq)]
pub struct ResearchOptions {
    pub max_urls_per_combo: usize,
    pub request_delay: Duration,
    pub user_agent: String,
    pub batch_size: usize,
    pub max_brands: usize,
    pub max_retries: u32,
    pub workers: usize,
    pub runs_root: PathBuf,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            max_urls_per_combo: MAX_URLS_PER_COMBO,
            request_delay: Duration::from_millis(REQUEST_DELAY_MS),
            user_agent: s!(USER_AGENT),
            batch_size: BATCH_SIZE,
            max_brands: MAX_BRANDS,
            max_retries: MAX_RETRIES,
            workers: WORKERS,
            runs_root: PathBuf::from(RUNS_DIR),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
    /// Delimiter for text output. Xlsx has none of its own; text copies of it are tab-separated.
    pub fn delim(&self) -> u8 {
        match self { ExportFormat::Csv => b',', ExportFormat::Tsv | ExportFormat::Xlsx => b'\t' }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Extra copy of the final table outside the run directory, if set.
    pub out_dir: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            out_dir: None,
        }
    }
}

impl ExportOptions {
    pub fn file_name(&self, stem: &str) -> String {
        join!(stem, ".", self.format.ext())
    }
}
