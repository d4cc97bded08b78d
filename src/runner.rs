// src/runner.rs
//
// Batched, resumable research runs: discover URLs per brand/cell/competitor,
// fetch + extract prices, append observations, rebuild the policy table.

use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::config::consts::COMPETITORS;
use crate::config::options::{AppOptions, ResearchOptions};
use crate::core::net::PageFetcher;
use crate::discovery::{build_queries, UrlDiscovery};
use crate::error::{FetchError, StoreError};
use crate::extract::extract_prices;
use crate::file::export_run_outputs;
use crate::observation::PriceObservation;
use crate::policy::{build_policy_output, Category, Gender, PolicyTable, CELLS};
use crate::progress::Progress;
use crate::store::{self, combo_key, DiscoveredUrls, ErrorRecord, RunPaths, RunProgress, RunStatus};

/// The two network collaborators a batch needs.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub discovery: &'a dyn UrlDiscovery,
    pub fetcher: &'a dyn PageFetcher,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub observations: usize,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// A batch ran; `number` is 1-based.
    Batch { number: usize, brands: Vec<String>, errors: Vec<String> },
    /// Nothing left to do; status is now complete.
    Complete,
    Cancelled,
    /// Not running (initialized or paused); nothing done.
    Idle,
}

/// `completed / total` clamped to [0, 1]; 0 for an empty run.
pub fn calculate_progress(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64).clamp(0.0, 1.0)
}

// ---------- messages ----------

pub fn search_error_message(err: &FetchError, query: &str) -> String {
    match err.status() {
        Some(code @ (401 | 429)) => {
            format!("Search API authentication/rate limit error ({code}) for {query}")
        }
        Some(code) => format!("Search API request failed ({code}) for {query}"),
        None => format!("Search API request failed for {query}"),
    }
}

pub fn fetch_error_message(err: &FetchError, url: &str) -> String {
    match err.status() {
        Some(403) => format!("Blocked (403) while fetching {url}"),
        Some(code) => format!("Fetch failed ({code}) for {url}"),
        None => format!("Fetch failed for {url}"),
    }
}

/// Run `op`, retrying retryable failures up to `max_retries` extra times.
fn with_retry<T>(
    max_retries: u32,
    delay: Duration,
    mut op: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut attempt = 0;
    loop {
        match op() {
            Err(e) if e.is_retryable() && attempt < max_retries => {
                attempt += 1;
                logd!("Retry {attempt}/{max_retries} after: {e}");
                thread::sleep(delay);
            }
            other => return other,
        }
    }
}

// ---------- batch ----------

struct FetchJob {
    gender: Gender,
    category: Category,
    competitor: &'static str,
    url: String,
}

enum FetchOutcome {
    Observed(PriceObservation),
    Failed { context: String, message: String },
}

/// Record a failure in errors.csv + run.log and keep it for the frontend.
fn record_error(
    paths: &RunPaths,
    report: &mut BatchReport,
    progress: &mut Option<&mut dyn Progress>,
    context: &str,
    message: String,
) -> Result<(), StoreError> {
    loge!("{context}: {message}");
    store::append_error(paths, &ErrorRecord::now(context, &message))?;
    store::write_log(paths, &message)?;
    if let Some(p) = progress.as_deref_mut() {
        p.item_failed(&message);
    }
    report.errors.push(message);
    Ok(())
}

/// URLs for every cell/competitor of one brand, from cache or search.
fn discover_for_brand(
    brand: &str,
    opts: &ResearchOptions,
    paths: &RunPaths,
    discovered: &mut DiscoveredUrls,
    discovery: &dyn UrlDiscovery,
    report: &mut BatchReport,
    progress: &mut Option<&mut dyn Progress>,
) -> Result<Vec<FetchJob>, StoreError> {
    let max_urls = opts.max_urls_per_combo;
    let mut jobs = Vec::new();

    for &(gender, category) in CELLS.iter() {
        for &(competitor, domain) in COMPETITORS {
            let key = combo_key(brand, gender, category, competitor);
            let mut urls = discovered.get(&key).cloned().unwrap_or_default();

            if urls.is_empty() {
                for query in build_queries(brand, gender, category, domain) {
                    let found = with_retry(opts.max_retries, opts.request_delay, || {
                        discovery.discover(&query, max_urls)
                    });
                    match found {
                        Ok(new_urls) => {
                            urls.extend(new_urls);
                            urls.truncate(max_urls);
                        }
                        Err(e) => {
                            let msg = search_error_message(&e, &query);
                            record_error(paths, report, progress, &key, msg)?;
                        }
                    }
                    thread::sleep(opts.request_delay);
                }
                if !urls.is_empty() {
                    discovered.insert(key, urls.clone());
                }
            }

            jobs.extend(urls.into_iter().take(max_urls).map(|url| FetchJob {
                gender,
                category,
                competitor,
                url,
            }));
        }
    }
    Ok(jobs)
}

/// Reborrow an optional progress sink for a shorter call.
fn reborrow<'a>(progress: &'a mut Option<&mut dyn Progress>) -> Option<&'a mut dyn Progress> {
    progress.as_mut().map(|p| &mut **p as &mut dyn Progress)
}

/// One batch of brands. Search/fetch failures are recorded and skipped;
/// only store failures end the batch early.
///
/// The URL cache is saved once a brand's URLs are known, and the brand is
/// marked completed (progress saved) as soon as its pages are written. A batch
/// that fails part-way keeps the brands it finished; a retry never fetches them twice.
pub fn run_batch(
    batch: &[String],
    opts: &ResearchOptions,
    paths: &RunPaths,
    discovered: &mut DiscoveredUrls,
    state: &mut RunProgress,
    services: Services<'_>,
    mut progress: Option<&mut dyn Progress>,
) -> Result<BatchReport, StoreError> {
    let mut report = BatchReport::default();

    for brand in batch {
        let jobs = discover_for_brand(
            brand, opts, paths, discovered, services.discovery, &mut report, &mut progress,
        )?;
        store::save_discovered_urls(paths, discovered)?;
        logd!("Batch: {} page(s) to fetch for {}", jobs.len(), brand);

        fetch_jobs(brand, &jobs, opts, paths, services.fetcher, &mut report, &mut progress)?;

        if !state.completed_brands.contains(brand) {
            state.completed_brands.push(brand.clone());
        }
        store::save_progress(paths, state)?;

        if let Some(p) = progress.as_deref_mut() {
            p.item_done(brand);
        }
    }
    Ok(report)
}

/// Fetch pages on a small worker pool; this thread is the only writer.
fn fetch_jobs(
    brand: &str,
    jobs: &[FetchJob],
    opts: &ResearchOptions,
    paths: &RunPaths,
    fetcher: &dyn PageFetcher,
    report: &mut BatchReport,
    progress: &mut Option<&mut dyn Progress>,
) -> Result<(), StoreError> {
    if jobs.is_empty() {
        return Ok(());
    }

    let counter = AtomicUsize::new(0);
    let abort = AtomicBool::new(false);
    let workers = opts.workers.min(jobs.len()).max(1);

    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<FetchOutcome>();

        for _ in 0..workers {
            let tx = tx.clone();
            let (counter, abort) = (&counter, &abort);
            scope.spawn(move || loop {
                if abort.load(Ordering::Relaxed) {
                    break;
                }
                let i = counter.fetch_add(1, Ordering::Relaxed);
                let Some(job) = jobs.get(i) else { break };

                let fetched = with_retry(opts.max_retries, opts.request_delay, || fetcher.fetch(&job.url));
                let outcome = match fetched {
                    Ok(html) => {
                        let info = extract_prices(&html, &job.url);
                        FetchOutcome::Observed(PriceObservation::new(
                            brand,
                            job.gender,
                            job.category,
                            job.competitor,
                            &job.url,
                            info.current_price,
                            info.was_price,
                        ))
                    }
                    Err(e) => FetchOutcome::Failed {
                        context: format!("{}|{}", combo_key(brand, job.gender, job.category, job.competitor), job.url),
                        message: fetch_error_message(&e, &job.url),
                    },
                };
                if tx.send(outcome).is_err() {
                    break;
                }
                thread::sleep(opts.request_delay); // be polite
            });
        }
        drop(tx); // this thread is sole receiver now

        for outcome in rx {
            let written = match outcome {
                FetchOutcome::Observed(obs) => store::append_observation(paths, &obs)
                    .and_then(|_| {
                        report.observations += 1;
                        store::write_log(
                            paths,
                            &format!("Fetched {} for {} {} {}", obs.url, obs.brand, obs.gender, obs.category),
                        )
                    }),
                FetchOutcome::Failed { context, message } => {
                    record_error(paths, report, progress, &context, message)
                }
            };
            if let Err(e) = written {
                abort.store(true, Ordering::Relaxed);
                return Err(e);
            }
        }
        Ok(())
    })
}

// ---------- run ----------

/// One research run bound to its folder under the runs root.
pub struct Run {
    pub paths: RunPaths,
    pub brands: Vec<String>,
    pub state: RunProgress,
    pub discovered: DiscoveredUrls,
    pub options: AppOptions,
    /// Search/fetch failures seen by this process, oldest first.
    pub last_errors: Vec<String>,
}

impl Run {
    /// Create or resume `run_id`. Progress and the URL cache are picked up
    /// from disk; the brand total follows the list given here.
    pub fn open(
        root: &Path,
        run_id: &str,
        brands: Vec<String>,
        options: AppOptions,
    ) -> Result<Self, StoreError> {
        let paths = store::ensure_run_dir(root, run_id)?;
        store::ensure_run_log(&paths)?;

        let mut state = store::load_progress(&paths)?
            .unwrap_or_else(|| RunProgress::new(run_id, brands.len()));
        if state.total_brands != brands.len() {
            state.total_brands = brands.len();
        }
        let discovered = store::load_discovered_urls(&paths)?;

        logf!(
            "Run {run_id}: opened ({} brands, {} completed, status {})",
            brands.len(),
            state.completed_brands.len(),
            state.status.as_str()
        );
        Ok(Self { paths, brands, state, discovered, options, last_errors: Vec::new() })
    }

    pub fn run_id(&self) -> &str { &self.paths.run_id }
    pub fn status(&self) -> RunStatus { self.state.status }

    /// Brands not yet completed, in input order.
    pub fn remaining(&self) -> Vec<String> {
        let done: HashSet<&str> = self.state.completed_brands.iter().map(String::as_str).collect();
        self.brands.iter().filter(|b| !done.contains(b.as_str())).cloned().collect()
    }

    pub fn progress_fraction(&self) -> f64 {
        calculate_progress(self.state.completed_brands.len(), self.brands.len())
    }

    fn batch_size(&self) -> usize {
        self.options.research.batch_size.max(1)
    }

    /// 1-based number of the batch the next step will run.
    pub fn batch_number(&self) -> usize {
        self.state.completed_brands.len() / self.batch_size() + 1
    }

    fn set_status(&mut self, status: RunStatus) -> Result<(), StoreError> {
        self.state.status = status;
        store::save_progress(&self.paths, &mut self.state)?;
        store::write_log(&self.paths, &format!("Run status: {}", status.as_str()))
    }

    pub fn start(&mut self) -> Result<(), StoreError> { self.set_status(RunStatus::Running) }
    pub fn pause(&mut self) -> Result<(), StoreError> { self.set_status(RunStatus::Paused) }
    pub fn resume(&mut self) -> Result<(), StoreError> { self.set_status(RunStatus::Running) }
    pub fn cancel(&mut self) -> Result<(), StoreError> { self.set_status(RunStatus::Cancelled) }

    /// Advance the run by at most one batch.
    pub fn step(
        &mut self,
        services: Services<'_>,
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<StepOutcome, Box<dyn Error>> {
        if self.state.status == RunStatus::Cancelled {
            store::save_progress(&self.paths, &mut self.state)?;
            return Ok(StepOutcome::Cancelled);
        }

        let remaining = self.remaining();
        if remaining.is_empty() {
            if self.state.status != RunStatus::Complete {
                self.set_status(RunStatus::Complete)?;
                self.refresh_outputs()?;
                logf!("Run {}: complete", self.run_id());
            }
            return Ok(StepOutcome::Complete);
        }
        if self.state.status != RunStatus::Running {
            return Ok(StepOutcome::Idle);
        }

        let number = self.batch_number();
        let batch: Vec<String> = remaining.into_iter().take(self.batch_size()).collect();
        let line = format!("Processing batch {number} with brands: {}", batch.join(", "));
        logf!("Run {}: {line}", self.run_id());
        store::write_log(&self.paths, &line)?;
        if let Some(p) = progress.as_deref_mut() {
            p.begin(number, &batch);
            p.log(&line);
        }

        let result = run_batch(
            &batch,
            &self.options.research,
            &self.paths,
            &mut self.discovered,
            &mut self.state,
            services,
            reborrow(&mut progress),
        );
        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        let report = result?;
        self.last_errors.extend(report.errors.iter().cloned());
        self.refresh_outputs()?;

        logf!(
            "Run {}: batch {number} done ({} observation(s), {} error(s))",
            self.run_id(),
            report.observations,
            report.errors.len()
        );
        Ok(StepOutcome::Batch { number, brands: batch, errors: report.errors })
    }

    /// Step until the run is complete, cancelled or paused.
    pub fn run_to_end(
        &mut self,
        services: Services<'_>,
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<StepOutcome, Box<dyn Error>> {
        loop {
            match self.step(services, reborrow(&mut progress))? {
                StepOutcome::Batch { .. } => continue,
                done => return Ok(done),
            }
        }
    }

    /// Current policy table from the full observation log.
    pub fn policy_table(&self) -> PolicyTable {
        let observations = store::load_observations(&self.paths);
        build_policy_output(&self.brands, &observations)
    }

    /// Rebuild the policy table and write every export.
    pub fn refresh_outputs(&self) -> Result<(PolicyTable, Vec<PathBuf>), Box<dyn Error>> {
        let table = self.policy_table();
        let written = export_run_outputs(&self.paths, &table, &self.options.export)?;
        Ok((table, written))
    }
}
