//! Command-line interface for codecritic.

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::Classifier;
use crate::config::{Config, DEFAULT_CONFIG_NAMES};
use crate::language::LanguageId;
use crate::metrics::MetricsEngine;
use crate::orchestrator::{Orchestrator, Preferences, ReviewMode, Strictness, Verbosity};
use crate::patterns::PatternLibrary;
use crate::pipeline::{parse_declared, Pipeline, ReviewRequest};
use crate::report::{self, FileReview, Gate};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Path argument meaning standard input.
const STDIN_PATH: &str = "-";

/// Directories never descended into during directory reviews.
const SKIPPED_DIRS: &[&str] = &["vendor", "node_modules", "target", "dist", "build", "__pycache__"];

/// Heuristic code review with language detection and static metrics.
///
/// Codecritic detects the language of a piece of code, measures it, and asks
/// a text-generation service for a structured review. Without credentials it
/// produces a local heuristic review instead.
#[derive(Parser)]
#[command(name = "codecritic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). CODECRITIC_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review a file, a directory, or standard input
    Review(ReviewArgs),
    /// Detect the language of a file or standard input
    Detect(DetectArgs),
    /// Compute static metrics for a file or standard input
    Metrics(MetricsArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the review command.
#[derive(Parser)]
pub struct ReviewArgs {
    /// Path to review (file, directory, or - for stdin)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Declared language (default: auto-detect)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Minimum acceptable overall score (exit non-zero if any review is lower)
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Review mode: full or quick
    #[arg(short, long, default_value = "full")]
    pub mode: String,

    /// Review strictness: strict, balanced, or lenient
    #[arg(long, default_value = "balanced")]
    pub strictness: String,

    /// Areas to focus on (comma-separated, e.g. security,performance)
    #[arg(long, value_delimiter = ',')]
    pub focus: Vec<String>,

    /// Review verbosity: brief, detailed, or comprehensive
    #[arg(long, default_value = "detailed")]
    pub verbosity: String,

    /// Overall time limit in seconds for each remote review
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show descriptions, strengths and statistics
    #[arg(long)]
    pub details: bool,
}

/// Arguments for the detect command.
#[derive(Parser)]
pub struct DetectArgs {
    /// File to classify (or - for stdin)
    pub path: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the metrics command.
#[derive(Parser)]
pub struct MetricsArgs {
    /// File to measure (or - for stdin)
    pub path: PathBuf,

    /// Language to measure as (default: auto-detect)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "codecritic.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Default configuration written by `init`.
const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

/// One input to review.
struct Input {
    path: String,
    code: String,
}

/// Parse a lowercase choice through its serde representation.
fn parse_choice<T: DeserializeOwned>(flag: &str, value: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .map_err(|_| anyhow::anyhow!("invalid --{} value {:?}", flag, value))
}

/// Read a file, or stdin for "-".
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == STDIN_PATH {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("reading standard input")?;
        return Ok(code);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Collect reviewable files under a directory.
fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // The root itself may be hidden (e.g. a temp dir); only prune below it.
            !(e.depth() > 0
                && e.file_type().is_dir()
                && (name.starts_with('.') || SKIPPED_DIRS.contains(&&*name)))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if LanguageId::from_extension(ext).is_none() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(relative) {
            debug!(path = %relative.display(), "excluded by config");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Gather inputs for a review path. Empty files in directories are skipped.
fn gather_inputs(path: &Path, config: &Config) -> anyhow::Result<Vec<Input>> {
    if path.as_os_str() == STDIN_PATH || path.is_file() {
        return Ok(vec![Input {
            path: path.to_string_lossy().to_string(),
            code: read_input(path)?,
        }]);
    }

    if !path.is_dir() {
        anyhow::bail!("cannot access path {:?}", path);
    }

    let files = collect_files(path, config)?;
    files
        .par_iter()
        .map(|file| {
            let code = read_input(file)?;
            Ok(Input {
                path: file.to_string_lossy().to_string(),
                code,
            })
        })
        .filter(|input: &anyhow::Result<Input>| {
            input.as_ref().map_or(true, |i| !i.code.trim().is_empty())
        })
        .collect()
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible || len < 2 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg} [{elapsed_precise}]")
    {
        bar.set_style(style);
    }
    bar
}

/// Cancel `cancel` once `signal` resolves successfully.
///
/// In-flight reviews then finish with the local fallback analysis.
async fn cancel_on<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            warn!("interrupted; remaining reviews fall back to local analysis");
            cancel.cancel();
        }
        Err(e) => debug!(error = %e, "could not listen for interrupts"),
    }
}

/// Run the review command.
pub fn run_review(args: &ReviewArgs) -> anyhow::Result<i32> {
    let format = args.format.as_str();
    if format != "pretty" && format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", format);
        return Ok(EXIT_ERROR);
    }

    let (config, config_path) = Config::load(args.config.as_deref())?;
    match &config_path {
        Some(p) => debug!(path = %p.display(), "loaded config"),
        None => debug!(
            "no config file found (looked for {}); using defaults",
            DEFAULT_CONFIG_NAMES.join(", ")
        ),
    }

    // Reject bad flags before any work is done.
    parse_declared(args.language.as_deref())?;
    let mode: ReviewMode = parse_choice("mode", &args.mode)?;
    let preferences = Preferences {
        strictness: parse_choice::<Strictness>("strictness", &args.strictness)?,
        focus_areas: args.focus.clone(),
        verbosity: parse_choice::<Verbosity>("verbosity", &args.verbosity)?,
    };

    let inputs = gather_inputs(&args.path, &config)?;
    if inputs.is_empty() {
        eprintln!("Warning: no files to review");
        return Ok(EXIT_SUCCESS);
    }

    let orchestrator = Orchestrator::from_config(&config.generation)?;
    if !orchestrator.has_client() {
        warn!(
            "no API key found in ${}; reviews will be generated locally",
            config.generation.api_key_env
        );
    }
    let concurrency = config.review.concurrency;
    let pipeline = Pipeline::new(config, PatternLibrary::global(), orchestrator);

    let requests: Vec<(String, ReviewRequest)> = inputs
        .into_iter()
        .map(|input| {
            let mut request = ReviewRequest::new(input.code)
                .with_preferences(preferences.clone())
                .with_mode(mode);
            request.language = args.language.clone();
            request.deadline = args.timeout.map(Duration::from_secs);
            (input.path, request)
        })
        .collect();

    // Local analysis is CPU-bound; run it across cores first.
    let prepared: Vec<_> = requests
        .into_par_iter()
        .map(|(path, request)| {
            let prepared = pipeline.prepare(&request);
            (path, request, prepared)
        })
        .collect();

    let bar = progress_bar(prepared.len(), format == "pretty");
    let cancel = CancellationToken::new();
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.spawn(cancel_on(tokio::signal::ctrl_c(), cancel.clone()));

    let mut reviews: Vec<FileReview> = runtime.block_on(async {
        stream::iter(prepared)
            .map(|(path, request, prepared)| {
                let pipeline = &pipeline;
                let cancel = cancel.clone();
                let bar = &bar;
                async move {
                    let outcome = match prepared {
                        Ok(p) => Ok(pipeline.complete(&request, p, cancel).await),
                        Err(e) => Err(e),
                    };
                    bar.inc(1);
                    FileReview { path, outcome }
                }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<FileReview>>()
            .await
    });
    bar.finish_and_clear();
    reviews.sort_by(|a, b| a.path.cmp(&b.path));

    let gate = Gate {
        min_score: args.min_score,
    };
    let path_str = args.path.to_string_lossy().to_string();
    match format {
        "json" => report::write_json(&path_str, &reviews, gate)?,
        _ => report::write_pretty(&path_str, &reviews, gate, args.details),
    }

    if gate.all_pass(&reviews) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the detect command.
pub fn run_detect(args: &DetectArgs) -> anyhow::Result<i32> {
    let code = read_input(&args.path)?;
    let result = Classifier::new(PatternLibrary::global()).classify(&code);

    match args.format.as_str() {
        "json" => report::write_value_json(&result)?,
        _ => report::write_detection_pretty(&args.path.to_string_lossy(), &result),
    }
    Ok(EXIT_SUCCESS)
}

/// Run the metrics command.
pub fn run_metrics(args: &MetricsArgs) -> anyhow::Result<i32> {
    let code = read_input(&args.path)?;
    let library = PatternLibrary::global();

    let language = match parse_declared(args.language.as_deref())? {
        Some(language) => language,
        None => Classifier::new(library).classify(&code).best_language,
    };
    let metrics = MetricsEngine::new(library).compute(&code, language);

    match args.format.as_str() {
        "json" => report::write_value_json(&metrics)?,
        _ => {
            println!("  {}", language.display_name());
            report::write_metrics_pretty(&args.path.to_string_lossy(), &metrics);
        }
    }
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or pass --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }

    std::fs::write(&args.output, DEFAULT_TEMPLATE)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set the API key: export {}=...", crate::config::DEFAULT_API_KEY_ENV);
    println!("  2. Run: codecritic review . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
