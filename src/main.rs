//! AdAudit - Directory Account Health Auditor
//!
//! A CLI tool that audits a JSON export of directory user accounts and
//! produces a categorized, aggregated view of account health: usage
//! recency, password expiry, lockout, and administrative privilege.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad input, unreadable export, write failure)

mod analysis;
mod cli;
mod config;
mod directory;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cli::{Args, OutputFormat};
use config::Config;
use directory::JsonRecordSource;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("AdAudit v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_audit(args) {
        error!("Audit failed: {}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .adaudit.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".adaudit.toml");

    if path.exists() {
        eprintln!(".adaudit.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .adaudit.toml")?;

    println!("Created .adaudit.toml with default settings.");
    println!("Edit it to customize rule tables, thresholds, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete audit workflow.
fn run_audit(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input: PathBuf = args
        .input
        .clone()
        .context("An input export file is required")?;

    // Reference instant for all recency math. When pinned via --as-of,
    // the generation timestamp is pinned too so repeated runs are
    // byte-identical.
    let (as_of, generated_at) = resolve_instants(&args)?;
    info!("Auditing {} as of {}", input.display(), as_of);

    // Step 1: Obtain the record sequence. Any failure here aborts the
    // run before any aggregation begins.
    let source =
        JsonRecordSource::open(&input).context("Failed to obtain the account record sequence")?;
    info!("Loaded {} raw records", source.len());

    // Step 2: Single forward pass - classify and aggregate together.
    let outcome = analysis::run_pass(source, &config.rules, as_of);
    info!(
        "Retained {} of {} records",
        outcome.accounts.len(),
        outcome.records_scanned
    );

    // Step 3: Assemble the report model.
    let report_model = report::build_report(
        &input.display().to_string(),
        as_of,
        generated_at,
        outcome,
    );

    // Step 4: Render and write.
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report_model)?,
        OutputFormat::Armored => report::generate_armored_report(&report_model)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report_model, &config.report)?,
    };

    let output_path = PathBuf::from(&config.general.output);
    report::write_report(&output, &output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    let stats = &report_model.stats;
    if !args.quiet {
        println!("\nAudit Summary:");
        println!("   Accounts:          {}", stats.total);
        println!("   Real active:       {}", stats.real_active);
        println!("   Stale:             {}", stats.stale);
        println!("   Never logged in:   {}", stats.never);
        println!("   Locked:            {}", stats.locked);
        println!("   Expired passwords: {}", stats.expired_password);
        println!("\nReport saved to: {}", output_path.display());
    }

    Ok(())
}

/// Resolve the reference and generation instants from the arguments.
fn resolve_instants(args: &Args) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    match args.as_of {
        Some(ref pinned) => {
            let as_of = DateTime::parse_from_rfc3339(pinned)
                .with_context(|| format!("Invalid --as-of timestamp: {}", pinned))?
                .with_timezone(&Utc);
            Ok((as_of, as_of))
        }
        None => {
            let now = Utc::now();
            Ok((now, now))
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .adaudit.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
