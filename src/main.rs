//! SEO Audit main entry point
//!
//! This is the command-line interface for the audit engine: it creates and
//! queues runs, crawls them, analyzes their pages and prints scorecards.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use seo_audit::analyzer::Analyzer;
use seo_audit::config::{load_config_with_hash, Config};
use seo_audit::crawler::crawl_run;
use seo_audit::output;
use seo_audit::scoring::Scorer;
use seo_audit::state::{cancel_run, create_run, queue_run, NewAuditRun, RunState};
use seo_audit::storage::{
    lock, open_storage, shared, ContentStore, FsContentStore, SharedStorage,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// SEO Audit: crawl a site politely, run SEO checks and score the result
#[derive(Parser, Debug)]
#[command(name = "seo-audit")]
#[command(version = "1.0.0")]
#[command(about = "Crawl, analyze and score a website", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "seo-audit.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a DRAFT run from seed URLs
    Create {
        #[command(flatten)]
        run: RunArgs,

        /// Queue the run right away
        #[arg(long)]
        queue: bool,
    },
    /// Move a DRAFT run to QUEUED
    Queue { run_id: i64 },
    /// Crawl a QUEUED run
    Crawl { run_id: i64 },
    /// Run every check over a run's pages
    Analyze { run_id: i64 },
    /// Print a run's scorecard
    Score {
        run_id: i64,

        /// Print the scorecard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare the scorecards of two runs
    Compare {
        run_a: i64,
        run_b: i64,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show crawl statistics for a run, or list all runs
    Stats { run_id: Option<i64> },
    /// Cancel a QUEUED or RUNNING run
    Cancel { run_id: i64 },
    /// Show a stored page
    Page {
        page_id: i64,

        /// Print the stored HTML body instead
        #[arg(long)]
        html: bool,
    },
    /// List the registered checks
    Checks,
    /// Create, crawl, analyze and score in one go
    Audit {
        #[command(flatten)]
        run: RunArgs,

        /// Print the scorecard as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Seeds and per-run crawl options
#[derive(Args, Debug)]
struct RunArgs {
    /// Seed URLs to start crawling from
    #[arg(required = true, value_name = "URL")]
    seeds: Vec<String>,

    #[arg(long)]
    max_pages: Option<u32>,

    #[arg(long)]
    concurrency: Option<u32>,

    #[arg(long)]
    crawl_delay_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(long)]
    max_redirects: Option<u32>,

    /// Don't keep raw HTML bodies for this run
    #[arg(long)]
    no_store_html: bool,

    /// Only crawl paths under this prefix (repeatable)
    #[arg(long = "allow-path", value_name = "PREFIX")]
    allowed_paths: Vec<String>,

    /// Never crawl paths under this prefix (repeatable)
    #[arg(long = "block-path", value_name = "PREFIX")]
    blocked_paths: Vec<String>,

    #[arg(long)]
    tenant: Option<String>,

    #[arg(long)]
    audit: Option<String>,
}

impl RunArgs {
    fn to_new_run(&self) -> NewAuditRun {
        let mut config = Map::new();
        if let Some(v) = self.max_pages {
            config.insert("max_pages".to_string(), v.into());
        }
        if let Some(v) = self.concurrency {
            config.insert("concurrency".to_string(), v.into());
        }
        if let Some(v) = self.crawl_delay_ms {
            config.insert("crawl_delay_ms".to_string(), v.into());
        }
        if let Some(v) = self.timeout {
            config.insert("timeout".to_string(), v.into());
        }
        if let Some(v) = self.max_redirects {
            config.insert("max_redirects".to_string(), v.into());
        }
        if self.no_store_html {
            config.insert("store_html".to_string(), Value::Bool(false));
        }
        if !self.allowed_paths.is_empty() {
            config.insert("allowed_paths".to_string(), self.allowed_paths.clone().into());
        }
        if !self.blocked_paths.is_empty() {
            config.insert("blocked_paths".to_string(), self.blocked_paths.clone().into());
        }

        NewAuditRun {
            tenant_ref: self.tenant.clone(),
            audit_ref: self.audit.clone(),
            seed_urls: self.seeds.clone(),
            config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let storage = open_shared(&config)?;

    match cli.command {
        Command::Create { run, queue } => {
            let run_id = handle_create(&storage, &run)?;
            if queue {
                handle_queue(&storage, run_id)?;
            }
            println!("{}", run_id);
        }
        Command::Queue { run_id } => handle_queue(&storage, run_id)?,
        Command::Crawl { run_id } => {
            handle_crawl(&config, storage, run_id).await?;
        }
        Command::Analyze { run_id } => handle_analyze(&storage, run_id)?,
        Command::Score { run_id, json } => handle_score(&config, storage, run_id, json)?,
        Command::Compare { run_a, run_b, json } => {
            let scorer = Scorer::new(storage, config.scoring.clone());
            let comparison = scorer
                .compare_runs(run_a, run_b)
                .with_context(|| format!("Failed to compare runs {} and {}", run_a, run_b))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                output::print_comparison(&comparison);
            }
        }
        Command::Stats { run_id } => handle_stats(&storage, run_id)?,
        Command::Cancel { run_id } => {
            let run = {
                let mut guard = lock(&storage)?;
                cancel_run(&mut *guard, run_id)
                    .with_context(|| format!("Failed to cancel run {}", run_id))?
            };
            println!("{}", output::format_run(&run));
        }
        Command::Page { page_id, html } => handle_page(&config, &storage, page_id, html)?,
        Command::Checks => {
            let analyzer = Analyzer::new(storage);
            let checks: Vec<_> = analyzer
                .available_checks()
                .into_iter()
                .filter_map(|code| analyzer.get_check(code))
                .collect();
            print!("{}", output::format_checks(&checks));
        }
        Command::Audit { run, json } => {
            let run_id = handle_create(&storage, &run)?;
            handle_queue(&storage, run_id)?;
            let state = handle_crawl(&config, storage.clone(), run_id).await?;
            if state != RunState::Completed {
                bail!("Run {} ended {}", run_id, state);
            }
            handle_analyze(&storage, run_id)?;
            handle_score(&config, storage, run_id, json)?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seo_audit=info,warn"),
            1 => EnvFilter::new("seo_audit=debug,info"),
            2 => EnvFilter::new("seo_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_shared(config: &Config) -> anyhow::Result<SharedStorage> {
    let db_path = Path::new(&config.output.database_path);
    let storage = open_storage(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    Ok(shared(storage))
}

fn content_store(config: &Config) -> anyhow::Result<Option<Arc<dyn ContentStore>>> {
    match &config.output.content_path {
        Some(path) => {
            let store = FsContentStore::new(path)
                .with_context(|| format!("Failed to open content store {}", path))?;
            Ok(Some(Arc::new(store)))
        }
        None => Ok(None),
    }
}

fn handle_create(storage: &SharedStorage, args: &RunArgs) -> anyhow::Result<i64> {
    let mut guard = lock(storage)?;
    let run = create_run(&mut *guard, &args.to_new_run()).context("Failed to create run")?;
    Ok(run.id)
}

fn handle_queue(storage: &SharedStorage, run_id: i64) -> anyhow::Result<()> {
    let mut guard = lock(storage)?;
    queue_run(&mut *guard, run_id).with_context(|| format!("Failed to queue run {}", run_id))?;
    Ok(())
}

async fn handle_crawl(
    config: &Config,
    storage: SharedStorage,
    run_id: i64,
) -> anyhow::Result<RunState> {
    let store = content_store(config)?;
    let state = crawl_run(config.clone(), storage.clone(), store, run_id)
        .await
        .with_context(|| format!("Failed to crawl run {}", run_id))?;

    let (run, stats) = {
        let guard = lock(&storage)?;
        output::load_run_statistics(&*guard, run_id)?
    };
    output::print_crawl_stats(&run, &stats);
    Ok(state)
}

fn handle_analyze(storage: &SharedStorage, run_id: i64) -> anyhow::Result<()> {
    let analyzer = Analyzer::new(storage.clone());
    let findings = analyzer
        .analyze_audit_run(run_id)
        .with_context(|| format!("Failed to analyze run {}", run_id))?;
    println!("Run {}: {} findings", run_id, findings.len());
    Ok(())
}

fn handle_score(
    config: &Config,
    storage: SharedStorage,
    run_id: i64,
    json: bool,
) -> anyhow::Result<()> {
    let scorer = Scorer::new(storage, config.scoring.clone());
    let card = scorer
        .score(run_id)
        .with_context(|| format!("Failed to score run {}", run_id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&card)?);
    } else {
        output::print_scorecard(&card);
    }
    Ok(())
}

fn handle_stats(storage: &SharedStorage, run_id: Option<i64>) -> anyhow::Result<()> {
    let guard = lock(storage)?;
    match run_id {
        Some(run_id) => {
            let (run, stats) = output::load_run_statistics(&*guard, run_id)
                .with_context(|| format!("Failed to load statistics for run {}", run_id))?;
            output::print_crawl_stats(&run, &stats);
        }
        None => {
            let runs = guard.list_runs()?;
            if runs.is_empty() {
                println!("No audit runs yet.");
            }
            for run in &runs {
                println!("{}", output::format_run(run));
            }
        }
    }
    Ok(())
}

fn handle_page(
    config: &Config,
    storage: &SharedStorage,
    page_id: i64,
    html: bool,
) -> anyhow::Result<()> {
    let page = lock(storage)?
        .get_page(page_id)
        .with_context(|| format!("Failed to load page {}", page_id))?;
    if !html {
        print!("{}", output::format_page(&page));
        return Ok(());
    }

    let Some(reference) = &page.content_ref else {
        bail!("Page {} has no stored body", page_id);
    };
    let Some(store) = content_store(config)? else {
        bail!("No content-path configured");
    };
    let body = store
        .load(reference)
        .with_context(|| format!("Failed to read stored body {}", reference))?;
    println!("{}", String::from_utf8_lossy(&body));
    Ok(())
}
