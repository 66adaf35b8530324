//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.adaudit.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Classification rule tables.
    #[serde(default)]
    pub rules: RuleConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "adaudit_report.json".to_string()
}

/// Classification rule tables.
///
/// These are the named, independently testable rule lists that drive the
/// normalizer and the classification engine. Extending a list in the
/// config file changes behavior without touching code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Username prefixes identifying service/system noise accounts.
    /// Matched case-insensitively; matching records are fully excluded.
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,

    /// Group names that confer administrative privilege when matched
    /// exactly (case-insensitive).
    #[serde(default = "default_admin_group_names")]
    pub admin_group_names: Vec<String>,

    /// Substrings that mark a group name as administrative when they
    /// appear anywhere in it (case-insensitive).
    #[serde(default = "default_admin_markers")]
    pub admin_markers: Vec<String>,

    /// Maximum days since logon for the "Active (PC)" bucket.
    #[serde(default = "default_active_days")]
    pub active_days: i64,

    /// Days since logon beyond which an account counts as stale.
    #[serde(default = "default_stale_days")]
    pub stale_days: i64,

    /// Years beyond the reference year after which a decoded logon date
    /// is treated as corrupted upstream data rather than a real logon.
    #[serde(default = "default_future_year_slack")]
    pub future_year_slack: i32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: default_excluded_prefixes(),
            admin_group_names: default_admin_group_names(),
            admin_markers: default_admin_markers(),
            active_days: default_active_days(),
            stale_days: default_stale_days(),
            future_year_slack: default_future_year_slack(),
        }
    }
}

fn default_excluded_prefixes() -> Vec<String> {
    vec!["HealthMailbox", "SM_", "MSOL_"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_admin_group_names() -> Vec<String> {
    vec!["Domain Admins", "Enterprise Admins"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_admin_markers() -> Vec<String> {
    vec!["Admin".to_string()]
}

fn default_active_days() -> i64 {
    60
}

fn default_stale_days() -> i64 {
    180
}

fn default_future_year_slack() -> i32 {
    5
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum departments shown in the Markdown summary table.
    #[serde(default = "default_top_departments")]
    pub top_departments: usize,

    /// Append the armored payload to Markdown output so the structured
    /// model can be recovered from the rendered document.
    #[serde(default = "default_true")]
    pub embed_armored: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_departments: default_top_departments(),
            embed_armored: true,
        }
    }
}

fn default_top_departments() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".adaudit.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Output path - always override since it has a default in CLI
        self.general.output = args.output.display().to_string();

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
