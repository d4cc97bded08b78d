// src/store.rs
//
// On-disk state of one research run, under `<root>/<run_id>/`:
//   progress.json         completed brands + status
//   discovered_urls.json  "brand|gender|category|competitor" -> urls
//   observations.csv      append-only price samples
//   errors.csv            append-only search/fetch failures
//   run.log               human-readable timeline
//   output_partial.*, us_discount_policy.*  exported policy table

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::consts::{FINAL_OUTPUT_STEM, PARTIAL_OUTPUT_STEM, RUN_LOG_BANNER};
use crate::config::options::ExportFormat;
use crate::error::StoreError;
use crate::observation::{ObservationRow, ObservationTable, PriceObservation};
use crate::policy::{Category, Gender};

pub type DiscoveredUrls = BTreeMap<String, Vec<String>>;

/// UTC timestamp in the run files' format (no offset suffix).
pub fn utc_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Fresh run id from the current UTC time.
pub fn new_run_id() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Cache key for one brand/cell/competitor combination.
pub fn combo_key(brand: &str, gender: Gender, category: Category, competitor: &str) -> String {
    format!("{brand}|{gender}|{category}|{competitor}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunPaths {
    pub run_id: String,
    pub base_dir: PathBuf,
}

impl RunPaths {
    pub fn new(root: &Path, run_id: &str) -> Self {
        Self { run_id: s!(run_id), base_dir: root.join(run_id) }
    }

    pub fn discovered_urls(&self) -> PathBuf { self.base_dir.join("discovered_urls.json") }
    pub fn observations(&self) -> PathBuf { self.base_dir.join("observations.csv") }
    pub fn errors(&self) -> PathBuf { self.base_dir.join("errors.csv") }
    pub fn progress(&self) -> PathBuf { self.base_dir.join("progress.json") }
    pub fn run_log(&self) -> PathBuf { self.base_dir.join("run.log") }

    pub fn output_partial(&self, format: ExportFormat) -> PathBuf {
        self.base_dir.join(join!(PARTIAL_OUTPUT_STEM, ".", format.ext()))
    }
    pub fn output_final(&self, format: ExportFormat) -> PathBuf {
        self.base_dir.join(join!(FINAL_OUTPUT_STEM, ".", format.ext()))
    }
}

pub fn ensure_run_dir(root: &Path, run_id: &str) -> Result<RunPaths, StoreError> {
    let paths = RunPaths::new(root, run_id);
    fs::create_dir_all(&paths.base_dir)?;
    Ok(paths)
}

// ---------- progress ----------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Initialized,
    Running,
    Paused,
    Cancelled,
    Complete,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Initialized => "initialized",
            RunStatus::Running     => "running",
            RunStatus::Paused      => "paused",
            RunStatus::Cancelled   => "cancelled",
            RunStatus::Complete    => "complete",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProgress {
    pub run_id: String,
    #[serde(default)]
    pub completed_brands: Vec<String>,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub total_brands: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl RunProgress {
    pub fn new(run_id: &str, total_brands: usize) -> Self {
        Self { run_id: s!(run_id), total_brands, ..Default::default() }
    }
}

pub fn load_progress(paths: &RunPaths) -> Result<Option<RunProgress>, StoreError> {
    let path = paths.progress();
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&text)?))
}

/// Stamps `updated_at` and rewrites progress.json.
pub fn save_progress(paths: &RunPaths, progress: &mut RunProgress) -> Result<(), StoreError> {
    progress.updated_at = Some(utc_iso());
    let json = serde_json::to_string_pretty(progress)?;
    fs::write(paths.progress(), json)?;
    Ok(())
}

// ---------- discovered urls ----------

pub fn load_discovered_urls(paths: &RunPaths) -> Result<DiscoveredUrls, StoreError> {
    let path = paths.discovered_urls();
    if !path.exists() {
        return Ok(DiscoveredUrls::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn save_discovered_urls(paths: &RunPaths, urls: &DiscoveredUrls) -> Result<(), StoreError> {
    fs::write(paths.discovered_urls(), serde_json::to_string_pretty(urls)?)?;
    Ok(())
}

// ---------- append-only logs ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: String,
    pub context: String,
    pub error: String,
}

impl ErrorRecord {
    pub fn now(context: &str, error: &str) -> Self {
        Self { timestamp: utc_iso(), context: s!(context), error: s!(error) }
    }
}

/// Append one serialized row; the header goes in only when the file is new.
fn append_csv_row<T: Serialize>(path: &Path, row: &T) -> Result<(), StoreError> {
    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    wtr.serialize(row)?;
    wtr.flush()?;
    Ok(())
}

pub fn append_observation(paths: &RunPaths, obs: &PriceObservation) -> Result<(), StoreError> {
    append_csv_row(&paths.observations(), obs)
}

pub fn append_error(paths: &RunPaths, record: &ErrorRecord) -> Result<(), StoreError> {
    append_csv_row(&paths.errors(), record)
}

/// The observation log projected onto the aggregator's four columns.
/// A missing or unreadable log is an empty table; bad rows are skipped.
pub fn load_observations(paths: &RunPaths) -> ObservationTable {
    read_observations(&paths.observations())
}

/// Same projection for any observation CSV on disk.
pub fn read_observations(path: &Path) -> ObservationTable {
    if !path.exists() {
        return ObservationTable::default();
    }
    let mut rdr = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(r) => r,
        Err(e) => {
            loge!("Store: cannot open {}: {}", path.display(), e);
            return ObservationTable::default();
        }
    };

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.deserialize::<ObservationRow>() {
        match rec {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        logd!("Store: skipped {} unreadable observation row(s)", skipped);
    }
    ObservationTable::new(rows)
}

/// Last `n` error messages from errors.csv, oldest first.
pub fn recent_errors(paths: &RunPaths, n: usize) -> Vec<String> {
    let Ok(mut rdr) = csv::Reader::from_path(paths.errors()) else { return Vec::new() };
    let all: Vec<String> = rdr
        .deserialize::<ErrorRecord>()
        .filter_map(Result::ok)
        .map(|r| r.error)
        .collect();
    let start = all.len().saturating_sub(n);
    all[start..].to_vec()
}

// ---------- run.log ----------

pub fn ensure_run_log(paths: &RunPaths) -> Result<(), StoreError> {
    let path = paths.run_log();
    if !path.exists() {
        fs::write(path, join!(RUN_LOG_BANNER, "\n"))?;
    }
    Ok(())
}

pub fn write_log(paths: &RunPaths, message: &str) -> Result<(), StoreError> {
    ensure_run_log(paths)?;
    let mut file = OpenOptions::new().append(true).open(paths.run_log())?;
    writeln!(file, "[{}] {}", utc_iso(), message)?;
    Ok(())
}

// ---------- discovery of runs ----------

/// Newest run id (lexicographically greatest) that has a progress file.
pub fn find_latest_run(root: &Path) -> Option<String> {
    let mut ids: Vec<String> = fs::read_dir(root)
        .ok()?
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids.into_iter()
        .find(|id| root.join(id).join("progress.json").exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_key_format() {
        assert_eq!(
            combo_key("Gucci", Gender::Men, Category::Bags, "Farfetch"),
            "Gucci|Men|Bags|Farfetch"
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&RunStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        assert_eq!(RunStatus::Complete.as_str(), "complete");
    }

    #[test]
    fn output_paths_follow_format() {
        let p = RunPaths::new(Path::new("runs"), "r1");
        assert!(p.output_final(ExportFormat::Tsv).ends_with("r1/us_discount_policy.tsv"));
        assert!(p.output_partial(ExportFormat::Csv).ends_with("r1/output_partial.csv"));
    }
}
