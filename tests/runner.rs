// tests/runner.rs
//
// Runs against in-memory search + page fakes; nothing touches the network.
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use discount_research::config::options::{AppOptions, ExportFormat};
use discount_research::core::net::PageFetcher;
use discount_research::discovery::UrlDiscovery;
use discount_research::error::FetchError;
use discount_research::progress::Progress;
use discount_research::runner::{Run, Services, StepOutcome};
use discount_research::store::{self, RunStatus};

/// Answers only Farfetch queries, with one URL built from the query words.
#[derive(Default)]
struct FakeSearch {
    calls: AtomicUsize,
    fail_with: Option<u16>,
}

impl UrlDiscovery for FakeSearch {
    fn discover(&self, query: &str, _max_results: usize) -> Result<Vec<String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_with {
            return Err(FetchError::Status { status, url: "https://search.test".into() });
        }
        if !query.contains("site:farfetch.com") {
            return Ok(Vec::new());
        }
        let slug = query.split(" site:").next().unwrap_or_default().replace(' ', "-");
        Ok(vec![format!("https://www.farfetch.com/{slug}")])
    }
}

/// Product pages at 80 (was 100); URLs mentioning "blocked" answer 403.
#[derive(Default)]
struct FakePages {
    calls: AtomicUsize,
}

impl PageFetcher for FakePages {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.to_lowercase().contains("blocked") {
            return Err(FetchError::Status { status: 403, url: url.into() });
        }
        Ok(r#"<script type="application/ld+json">
            {"@type":"Product","offers":{"price":"80.00","priceSpecification":{"price":"100.00"}}}
        </script>"#
            .to_string())
    }
}

#[derive(Default)]
struct Recorder {
    batches: Vec<usize>,
    done: Vec<String>,
    failed: Vec<String>,
    finished: usize,
}

impl Progress for Recorder {
    fn begin(&mut self, batch_number: usize, _brands: &[String]) { self.batches.push(batch_number); }
    fn item_done(&mut self, brand: &str) { self.done.push(brand.to_string()); }
    fn item_failed(&mut self, msg: &str) { self.failed.push(msg.to_string()); }
    fn finish(&mut self) { self.finished += 1; }
}

fn options(batch_size: usize) -> AppOptions {
    let mut opts = AppOptions::default();
    opts.research.batch_size = batch_size;
    opts.research.request_delay = Duration::ZERO;
    opts.research.workers = 2;
    opts.research.max_retries = 0;
    opts
}

fn brands(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn open(root: &Path, names: &[&str], batch_size: usize) -> Run {
    Run::open(root, "test_run", brands(names), options(batch_size)).unwrap()
}

#[test]
fn runs_in_batches_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let (search, pages) = (FakeSearch::default(), FakePages::default());
    let services = Services { discovery: &search, fetcher: &pages };
    let mut recorder = Recorder::default();

    let mut run = open(dir.path(), &["Gucci", "Prada", "Coach"], 2);
    run.start().unwrap();
    let outcome = run.run_to_end(services, Some(&mut recorder)).unwrap();

    assert_eq!(outcome, StepOutcome::Complete);
    assert_eq!(run.status(), RunStatus::Complete);
    assert_eq!(recorder.batches, vec![1, 2]);
    assert_eq!(recorder.done, brands(&["Gucci", "Prada", "Coach"]));
    assert_eq!(recorder.finished, 2);
    assert_eq!(run.progress_fraction(), 1.0);

    // 3 brands x 13 cells x 3 competitors, one query each
    assert_eq!(search.calls.load(Ordering::SeqCst), 117);
    // Only Farfetch returns a page
    assert_eq!(pages.calls.load(Ordering::SeqCst), 39);

    let observations = store::load_observations(&run.paths);
    assert_eq!(observations.len(), 39);
    assert!(observations.rows.iter().all(|r| r.discount_pct == Some(20.0)));

    let saved = store::load_progress(&run.paths).unwrap().unwrap();
    assert_eq!(saved.status, RunStatus::Complete);
    assert_eq!(saved.completed_brands.len(), 3);
    assert_eq!(store::load_discovered_urls(&run.paths).unwrap().len(), 39);

    let exported = std::fs::read_to_string(run.paths.output_final(ExportFormat::Csv)).unwrap();
    assert_eq!(exported.lines().count(), 1 + 39);
    assert!(exported.starts_with("brand,gender,category,public_sale_discount_pct"));
    assert!(run.paths.output_partial(ExportFormat::Csv).exists());

    let log = std::fs::read_to_string(run.paths.run_log()).unwrap();
    assert!(log.contains("Processing batch 1 with brands: Gucci, Prada"));
    assert!(log.contains("Processing batch 2 with brands: Coach"));
    assert!(log.contains("Fetched https://www.farfetch.com/"));
}

#[test]
fn step_does_nothing_until_started() {
    let dir = tempfile::tempdir().unwrap();
    let (search, pages) = (FakeSearch::default(), FakePages::default());
    let services = Services { discovery: &search, fetcher: &pages };

    let mut run = open(dir.path(), &["Gucci"], 1);
    assert_eq!(run.step(services, None).unwrap(), StepOutcome::Idle);

    run.start().unwrap();
    run.pause().unwrap();
    assert_eq!(run.step(services, None).unwrap(), StepOutcome::Idle);
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store::load_progress(&run.paths).unwrap().unwrap().status, RunStatus::Paused);
}

#[test]
fn cancel_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let (search, pages) = (FakeSearch::default(), FakePages::default());
    let services = Services { discovery: &search, fetcher: &pages };

    let mut run = open(dir.path(), &["Gucci", "Prada"], 1);
    run.start().unwrap();
    assert!(matches!(run.step(services, None).unwrap(), StepOutcome::Batch { number: 1, .. }));
    run.cancel().unwrap();

    assert_eq!(run.run_to_end(services, None).unwrap(), StepOutcome::Cancelled);
    let saved = store::load_progress(&run.paths).unwrap().unwrap();
    assert_eq!(saved.status, RunStatus::Cancelled);
    assert_eq!(saved.completed_brands, brands(&["Gucci"]));
}

#[test]
fn reopened_run_resumes_with_url_cache() {
    let dir = tempfile::tempdir().unwrap();
    let (search, pages) = (FakeSearch::default(), FakePages::default());
    let services = Services { discovery: &search, fetcher: &pages };

    {
        let mut run = open(dir.path(), &["Gucci", "Prada"], 1);
        run.start().unwrap();
        run.step(services, None).unwrap();
        run.pause().unwrap();
    }
    assert_eq!(search.calls.load(Ordering::SeqCst), 39);

    let mut run = open(dir.path(), &["Gucci", "Prada"], 1);
    assert_eq!(run.status(), RunStatus::Paused);
    assert_eq!(run.remaining(), brands(&["Prada"]));
    assert_eq!(run.batch_number(), 2);

    // Drop Gucci from the completed list: its Farfetch URLs are cached,
    // the empty combos are searched again.
    run.state.completed_brands.clear();
    run.resume().unwrap();
    let outcome = run.step(services, None).unwrap();
    assert!(matches!(outcome, StepOutcome::Batch { number: 1, .. }));
    assert_eq!(search.calls.load(Ordering::SeqCst), 39 + 26);
}

#[test]
fn blocked_pages_are_recorded_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let (search, pages) = (FakeSearch::default(), FakePages::default());
    let services = Services { discovery: &search, fetcher: &pages };
    let mut recorder = Recorder::default();

    let mut run = open(dir.path(), &["Blocked Label"], 5);
    run.start().unwrap();
    let outcome = run.step(services, Some(&mut recorder)).unwrap();

    let StepOutcome::Batch { errors, .. } = outcome else { panic!("expected a batch") };
    assert_eq!(errors.len(), 13);
    assert!(errors[0].starts_with("Blocked (403) while fetching https://www.farfetch.com/Blocked-Label"));
    assert_eq!(recorder.failed.len(), 13);
    assert_eq!(recorder.done, brands(&["Blocked Label"]));

    assert!(store::load_observations(&run.paths).is_empty());
    assert_eq!(store::recent_errors(&run.paths, 100).len(), 13);
    assert_eq!(run.last_errors.len(), 13);

    // Brand still counts as processed
    assert_eq!(run.run_to_end(services, None).unwrap(), StepOutcome::Complete);
}

#[test]
fn search_auth_failure_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let search = FakeSearch { fail_with: Some(401), ..Default::default() };
    let pages = FakePages::default();
    let services = Services { discovery: &search, fetcher: &pages };

    let mut run = Run::open(dir.path(), "r", brands(&["Gucci"]), {
        let mut o = options(1);
        o.research.max_retries = 3;
        o
    })
    .unwrap();
    run.start().unwrap();
    let StepOutcome::Batch { errors, .. } = run.step(services, None).unwrap() else { panic!("expected a batch") };

    assert_eq!(search.calls.load(Ordering::SeqCst), 39);
    assert_eq!(pages.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        errors[0],
        "Search API authentication/rate limit error (401) for Gucci men clothing site:net-a-porter.com sale"
    );
    // Nothing cached for failed combos
    assert!(store::load_discovered_urls(&run.paths).unwrap().is_empty());
}

#[test]
fn zero_observation_run_exports_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let search = FakeSearch { fail_with: Some(500), ..Default::default() };
    let pages = FakePages::default();
    let services = Services { discovery: &search, fetcher: &pages };

    let mut run = open(dir.path(), &["Rolex"], 1);
    run.start().unwrap();
    assert_eq!(run.run_to_end(services, None).unwrap(), StepOutcome::Complete);

    let table = run.policy_table();
    assert_eq!(table.len(), 13);
    assert!(table.rows.iter().all(|r| r.why == "No observations; inferred defaults"));
}

#[test]
fn failed_batch_keeps_finished_brands() {
    let dir = tempfile::tempdir().unwrap();
    let (search, pages) = (FakeSearch::default(), FakePages::default());
    let services = Services { discovery: &search, fetcher: &pages };

    let mut run = open(dir.path(), &["Gucci", "Blocked"], 2);
    run.start().unwrap();

    // errors.csv cannot be appended while it is a folder
    std::fs::create_dir(run.paths.errors()).unwrap();
    assert!(run.step(services, None).is_err());

    let gucci_rows = |run: &Run| {
        store::load_observations(&run.paths)
            .rows
            .iter()
            .filter(|r| r.brand.as_deref() == Some("Gucci"))
            .count()
    };
    assert_eq!(gucci_rows(&run), 13);
    let saved = store::load_progress(&run.paths).unwrap().unwrap();
    assert_eq!(saved.completed_brands, brands(&["Gucci"]));
    assert_eq!(store::load_discovered_urls(&run.paths).unwrap().len(), 26);

    std::fs::remove_dir(run.paths.errors()).unwrap();
    let fetched_before = pages.calls.load(Ordering::SeqCst);
    let StepOutcome::Batch { brands: retried, .. } = run.step(services, None).unwrap() else {
        panic!("expected a batch")
    };

    assert_eq!(retried, brands(&["Blocked"]));
    assert_eq!(gucci_rows(&run), 13);
    // Only Blocked's cached pages were fetched again
    assert_eq!(pages.calls.load(Ordering::SeqCst) - fetched_before, 13);
    assert_eq!(run.run_to_end(services, None).unwrap(), StepOutcome::Complete);
}
