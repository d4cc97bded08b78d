// src/config/loader.rs
//
// Optional TOML overrides on top of compiled defaults.
// Files are applied in order; a later file wins field by field.
//
//   # config.toml
//   batch_size = 5
//   max_urls_per_combo = 4
//   request_delay_seconds = 1.5
//   user_agent = "MyResearcher/2.0"
//   export_format = "tsv"

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use super::consts::CONFIG_FILES;
use super::options::{AppOptions, ExportFormat};

/// One config file. Every field optional so files can be partial.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub max_urls_per_combo: Option<usize>,
    pub request_delay_seconds: Option<f64>,
    pub user_agent: Option<String>,
    pub batch_size: Option<usize>,
    pub max_brands: Option<usize>,
    pub max_retries: Option<u32>,
    pub workers: Option<usize>,
    pub runs_root: Option<PathBuf>,
    pub export_format: Option<ExportFormat>,
    pub export_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Overlay this file's values onto `opts`.
    pub fn apply(&self, opts: &mut AppOptions) {
        let r = &mut opts.research;
        if let Some(v) = self.max_urls_per_combo { r.max_urls_per_combo = v.max(1); }
        if let Some(v) = self.request_delay_seconds {
            if v.is_finite() && v >= 0.0 {
                r.request_delay = Duration::from_secs_f64(v);
            }
        }
        if let Some(v) = &self.user_agent { r.user_agent = v.clone(); }
        if let Some(v) = self.batch_size { r.batch_size = v.max(1); }
        if let Some(v) = self.max_brands { r.max_brands = v; }
        if let Some(v) = self.max_retries { r.max_retries = v; }
        if let Some(v) = self.workers { r.workers = v.max(1); }
        if let Some(v) = &self.runs_root { r.runs_root = v.clone(); }
        if let Some(v) = self.export_format { opts.export.format = v; }
        if let Some(v) = &self.export_dir { opts.export.out_dir = Some(v.clone()); }
    }
}

/// Defaults, then each of `config.toml`, `config.local.toml` in `dir` that exists.
pub fn load_options(dir: &Path) -> Result<AppOptions, ConfigError> {
    let files: Vec<PathBuf> = CONFIG_FILES.iter().map(|f| dir.join(f)).collect();
    load_options_from(&files)
}

/// Defaults overlaid with the given files; missing files are skipped.
pub fn load_options_from(files: &[PathBuf]) -> Result<AppOptions, ConfigError> {
    let mut opts = AppOptions::default();
    for path in files {
        if !path.exists() {
            continue;
        }
        let file = ConfigFile::read(path)?;
        file.apply(&mut opts);
        logf!("Config: applied {}", path.display());
    }
    Ok(opts)
}
