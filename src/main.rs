//! Footbag Mirror main entry point
//!
//! This is the command-line interface for the footbag.org archival mirror.

use anyhow::{Context, Result};
use clap::Parser;
use footbag_mirror::config::{
    load_policy_with_hash, load_seeds, validate_settings, CrawlSettings, Policy,
    DEFAULT_USER_AGENT,
};
use footbag_mirror::crawler::run_crawl;
use footbag_mirror::output::{load_counters, print_counters};
use footbag_mirror::{in_scope, normalize_url};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Footbag Mirror: a public-only archival crawler
///
/// Crawls the configured hosts and path prefixes breadth-first, saving every
/// in-scope resource under the mirror root and recording one JSON line per
/// attempt in the manifest.
#[derive(Parser, Debug)]
#[command(name = "footbag-mirror")]
#[command(version)]
#[command(about = "A deterministic, replayable website mirror", long_about = None)]
struct Cli {
    /// Newline-delimited seed URL list
    #[arg(long, value_name = "FILE", required_unless_present = "stats")]
    seeds: Option<PathBuf>,

    /// Scope policy file (.json or .toml)
    #[arg(long, value_name = "FILE", required_unless_present = "stats")]
    policy: Option<PathBuf>,

    /// Directory receiving mirrored files
    #[arg(long, value_name = "DIR", default_value = "mirror_out")]
    mirror_root: PathBuf,

    /// Directory receiving the manifest and sanity summary
    #[arg(long, value_name = "DIR", default_value = "out")]
    out_dir: PathBuf,

    /// Pause after every request, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.25)]
    delay: f64,

    /// Per-request timeout, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 20.0)]
    timeout: f64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate inputs and show which seeds are in scope without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Recompute counters from an existing manifest and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    fn settings(&self) -> Result<CrawlSettings> {
        let settings = CrawlSettings {
            mirror_root: self.mirror_root.clone(),
            out_dir: self.out_dir.clone(),
            delay: seconds(self.delay).context("Invalid --delay")?,
            timeout: seconds(self.timeout).context("Invalid --timeout")?,
            user_agent: self.user_agent.clone(),
        };
        validate_settings(&settings)?;
        Ok(settings)
    }
}

fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("{} is not a valid duration", value))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings()?;

    if cli.stats {
        return handle_stats(&settings);
    }

    // clap enforces both inputs outside --stats
    let (Some(policy_path), Some(seeds_path)) = (&cli.policy, &cli.seeds) else {
        anyhow::bail!("--policy and --seeds are required");
    };

    tracing::info!("Loading policy from: {}", policy_path.display());
    let (policy, hash) = load_policy_with_hash(policy_path)
        .with_context(|| format!("Failed to load policy {}", policy_path.display()))?;
    tracing::info!("Policy loaded successfully (hash: {})", hash);

    let seeds = load_seeds(seeds_path)
        .with_context(|| format!("Failed to read seeds {}", seeds_path.display()))?;
    tracing::info!("Loaded {} seed URLs", seeds.len());

    if cli.dry_run {
        handle_dry_run(&policy, &settings, &seeds);
        return Ok(());
    }

    handle_crawl(policy, settings, seeds).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("footbag_mirror=info,warn"),
            1 => EnvFilter::new("footbag_mirror=debug,info"),
            2 => EnvFilter::new("footbag_mirror=trace,debug"),
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

/// Handles the --dry-run mode: shows the policy and which seeds would be queued
fn handle_dry_run(policy: &Policy, settings: &CrawlSettings, seeds: &[String]) {
    println!("=== Footbag Mirror Dry Run ===\n");

    println!("Settings:");
    println!("  Mirror root: {}", settings.mirror_root.display());
    println!("  Manifest: {}", settings.manifest_path().display());
    println!("  Delay: {:?}", settings.delay);
    println!("  Timeout: {:?}", settings.timeout);
    println!("  User agent: {}", settings.user_agent);

    let mut hosts: Vec<_> = policy.allowed_hosts.iter().collect();
    hosts.sort();
    println!("\nAllowed hosts ({}):", hosts.len());
    for host in hosts {
        println!("  - {}", host);
    }

    println!("\nAllowed path prefixes ({}):", policy.allowed_path_prefixes.len());
    for prefix in &policy.allowed_path_prefixes {
        println!("  - {}", prefix);
    }

    let mut queued = 0;
    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        let url = normalize_url(seed, policy);
        if in_scope(&url, policy) {
            queued += 1;
            println!("  * {}", url);
        } else {
            println!("  x {} (out of scope)", url);
        }
    }

    println!("\n✓ Policy is valid");
    println!("✓ Would start crawling with {} in-scope seed URLs", queued);
}

/// Handles the --stats mode: recomputes counters from the manifest
fn handle_stats(settings: &CrawlSettings) -> Result<()> {
    let manifest_path = settings.manifest_path();
    println!("Manifest: {}\n", manifest_path.display());

    let (counters, records) = load_counters(&manifest_path)
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;
    print_counters(&counters, records);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(policy: Policy, settings: CrawlSettings, seeds: Vec<String>) -> Result<()> {
    tracing::info!(
        "Allowed hosts: {}, path prefixes: {}",
        policy.allowed_hosts.len(),
        policy.allowed_path_prefixes.len()
    );

    let sanity_path = settings.sanity_path();
    let report = run_crawl(policy, settings, seeds).await?;

    tracing::info!(
        "Crawl completed successfully: {} attempts, {} saved ({} HTML), {} HTTP failures, {} errors",
        report.attempts,
        report.counters.saved_files,
        report.counters.saved_html,
        report.http_failures,
        report.errors
    );
    tracing::info!("Summary written to {}", sanity_path.display());

    Ok(())
}
