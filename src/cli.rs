//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// AdAudit - directory account health auditor
///
/// Audits a JSON export of directory user accounts and produces a
/// categorized, aggregated view of account health: usage recency,
/// password expiry, lockout, and administrative privilege.
///
/// Examples:
///   adaudit --input accounts.json
///   adaudit --input accounts.json --format markdown --output report.md
///   adaudit --input accounts.json --as-of 2026-01-15T00:00:00Z
///   adaudit --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the JSON account export to audit
    ///
    /// A JSON array of objects, one per account, with directory attribute
    /// names as keys. Not required when using --init-config.
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    #[arg(
        short,
        long,
        default_value = "adaudit_report.json",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Output format (json, armored, markdown)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Reference instant for all recency calculations (RFC 3339)
    ///
    /// Defaults to the current time. Pinning it makes repeated runs over
    /// the same input byte-identical.
    #[arg(long, value_name = "TIMESTAMP", env = "ADAUDIT_AS_OF")]
    pub as_of: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .adaudit.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .adaudit.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// Base64-armored JSON, safe to embed in a larger text document
    Armored,
    /// Human-readable Markdown summary
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate input path if provided
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        // Validate the reference timestamp if provided
        if let Some(ref as_of) = self.as_of {
            if chrono::DateTime::parse_from_rfc3339(as_of).is_err() {
                return Err(format!(
                    "Invalid --as-of timestamp (expected RFC 3339): {}",
                    as_of
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
