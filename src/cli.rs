// src/cli.rs
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::brands::read_brands;
use crate::config::consts::{FINAL_OUTPUT_STEM, RUNS_DIR};
use crate::config::loader::{load_options, load_options_from};
use crate::config::options::{AppOptions, ExportFormat};
use crate::core::net::HttpClient;
use crate::discovery::{search_api_status, SearchClient};
use crate::file::{resolve_single_out_path, write_policy_table};
use crate::observation::ObservationTable;
use crate::policy::build_policy_output;
use crate::progress::Progress;
use crate::runner::{Run, Services, StepOutcome};
use crate::store::{self, ensure_run_dir, find_latest_run, load_progress, new_run_id, RunPaths};

#[derive(Parser, Debug)]
#[command(name = "discount_research", version, about = "US discount policy researcher")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run (or resume) a research run until every brand is done
    Run(RunArgs),
    /// Build the policy table from an observation log without any network
    Policy(PolicyArgs),
    /// Write the all-defaults table for two sample brands
    Selfcheck(RootArgs),
    /// Search API status and progress of the latest run
    Status(RootArgs),
}

#[derive(Args, Debug)]
pub struct RootArgs {
    /// Runs root folder (defaults to config / "runs")
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// .csv or .xlsx file with a `brand` column
    #[arg(long)]
    pub brands: PathBuf,
    /// Resume this run id instead of starting a new one
    #[arg(long)]
    pub run_id: Option<String>,
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Config file (replaces config.toml / config.local.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[arg(long)]
    pub brands: PathBuf,
    /// observations.csv from a previous run; omitted means no observations
    #[arg(long)]
    pub observations: Option<PathBuf>,
    /// Output file or folder
    #[arg(short, long, default_value = "")]
    pub out: String,
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    pub format: FormatArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Csv,
    Tsv,
    Xlsx,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Tsv => ExportFormat::Tsv,
            FormatArg::Xlsx => ExportFormat::Xlsx,
        }
    }
}

/// Prints batch progress to stdout.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn log(&mut self, msg: &str) { println!("{msg}"); }
    fn item_done(&mut self, brand: &str) { println!("  done: {brand}"); }
    fn item_failed(&mut self, msg: &str) { eprintln!("  ! {msg}"); }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Policy(args) => cmd_policy(args),
        Command::Selfcheck(args) => cmd_selfcheck(args),
        Command::Status(args) => cmd_status(args),
    }
}

fn options_with_root(root: Option<PathBuf>, config: Option<PathBuf>) -> Result<AppOptions> {
    // debug log goes under the root given on the command line, config can't move it
    crate::log::init(root.as_deref().unwrap_or(Path::new(RUNS_DIR)));

    let mut opts = match config {
        Some(path) => load_options_from(&[path])?,
        None => load_options(Path::new("."))?,
    };
    if let Some(root) = root {
        opts.research.runs_root = root;
    }
    Ok(opts)
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let opts = options_with_root(args.root, args.config)?;
    let brands = read_brands(&args.brands, opts.research.max_brands)?;
    if brands.is_empty() {
        return Err(eyre!("No brands found in {}", args.brands.display()));
    }

    let (api_status, _) = search_api_status();
    println!("{api_status}");

    let http = HttpClient::new(&opts.research.user_agent)?;
    let search = SearchClient::from_env(http.clone(), opts.research.request_delay);
    let services = Services { discovery: &search, fetcher: &http };

    let run_id = args.run_id.unwrap_or_else(new_run_id);
    let root = opts.research.runs_root.clone();
    let mut run = Run::open(&root, &run_id, brands, opts)
        .wrap_err_with(|| format!("Cannot open run {run_id}"))?;
    println!("Run {run_id}: {} brands, {} remaining", run.brands.len(), run.remaining().len());

    run.start()?;
    let mut console = ConsoleProgress;
    let outcome = run
        .run_to_end(services, Some(&mut console))
        .map_err(|e| eyre!("{e}"))?;

    match outcome {
        StepOutcome::Cancelled => println!("Run cancelled."),
        _ => {
            let summary = run.policy_table().summary();
            println!("Completed {} of {} brands", run.state.completed_brands.len(), run.brands.len());
            println!("OBSERVED rows: {}", summary.observed_rows);
            println!("INFERRED rows: {}", summary.inferred_rows);
            println!("Average sale pct: {}", summary.avg_sale_pct);
            println!("Wrote {}", run.paths.output_final(run.options.export.format).display());
        }
    }
    Ok(())
}

fn cmd_policy(args: PolicyArgs) -> Result<()> {
    let opts = options_with_root(None, None)?;
    let brands = read_brands(&args.brands, opts.research.max_brands)?;
    let observations = match &args.observations {
        Some(path) => store::read_observations(path),
        None => ObservationTable::default(),
    };

    let format = ExportFormat::from(args.format);
    let table = build_policy_output(&brands, &observations);
    let default_name = join!(FINAL_OUTPUT_STEM, ".", format.ext());
    let out = resolve_single_out_path(&args.out, &default_name).map_err(|e| eyre!("{e}"))?;
    write_policy_table(&out, &table, format).map_err(|e| eyre!("{e}"))?;

    println!("Wrote {} rows to {}", table.len(), out.display());
    Ok(())
}

fn cmd_selfcheck(args: RootArgs) -> Result<()> {
    let opts = options_with_root(args.root, None)?;
    let run_id = join!("selfcheck_", &new_run_id());
    let paths = ensure_run_dir(&opts.research.runs_root, &run_id)?;

    let brands = ["SampleBrandA", "SampleBrandB"];
    let table = build_policy_output(&brands[..], &ObservationTable::default());
    let out = paths.output_final(opts.export.format);
    write_policy_table(&out, &table, opts.export.format).map_err(|e| eyre!("{e}"))?;

    println!("Wrote {}", out.display());
    Ok(())
}

fn cmd_status(args: RootArgs) -> Result<()> {
    let opts = options_with_root(args.root, None)?;
    let (api_status, _) = search_api_status();
    println!("{api_status}");

    let root = &opts.research.runs_root;
    let Some(run_id) = find_latest_run(root) else {
        println!("No runs under {}", root.display());
        return Ok(());
    };
    let paths = RunPaths::new(root, &run_id);
    if let Some(p) = load_progress(&paths)? {
        let pct = crate::runner::calculate_progress(p.completed_brands.len(), p.total_brands) * 100.0;
        println!(
            "Run {}: {} ({} of {} brands, {:.0}%)",
            p.run_id,
            p.status.as_str(),
            p.completed_brands.len(),
            p.total_brands,
            pct
        );
    }
    for err in store::recent_errors(&paths, 10) {
        println!("  ! {err}");
    }
    Ok(())
}
