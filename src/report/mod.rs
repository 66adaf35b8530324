//! Report model assembly and rendering.
//!
//! This module builds the final `ReportModel` from an engine pass and
//! renders it as pretty JSON, as an armored payload, or as a Markdown
//! summary for humans. Interactive presentation (tables, charts, search)
//! belongs to whatever consumes the model, not to this crate.

pub mod armor;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::Path;

use crate::analysis::PassOutcome;
use crate::config::ReportConfig;
use crate::models::{ReportMetadata, ReportModel};

/// Assemble the immutable report model from one engine pass.
///
/// `generated_at` is passed in rather than sampled here so that a pinned
/// reference instant yields byte-identical reports across runs.
pub fn build_report(
    source: &str,
    as_of: DateTime<Utc>,
    generated_at: DateTime<Utc>,
    outcome: PassOutcome,
) -> ReportModel {
    let (department_labels, department_counts): (Vec<String>, Vec<usize>) = outcome
        .stats
        .departments
        .iter()
        .map(|d| (d.name.clone(), d.count))
        .unzip();

    ReportModel {
        metadata: ReportMetadata {
            source: source.to_string(),
            generated_at,
            as_of,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            records_scanned: outcome.records_scanned,
            accounts_retained: outcome.accounts.len(),
        },
        accounts: outcome.accounts,
        stats: outcome.stats,
        department_labels,
        department_counts,
    }
}

/// Generate a pretty-printed JSON report.
pub fn generate_json_report(report: &ReportModel) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the armored form of the report.
///
/// `armor::unarmor` on the result reproduces the JSON bytes exactly.
pub fn generate_armored_report(report: &ReportModel) -> Result<String> {
    let json = generate_json_report(report)?;
    Ok(armor::armor(json.as_bytes()))
}

/// Generate a Markdown summary of the report.
pub fn generate_markdown_report(report: &ReportModel, config: &ReportConfig) -> Result<String> {
    let mut output = String::new();

    output.push_str("# AdAudit Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_department_section(report, config.top_departments));
    output.push_str(&generate_accounts_section(report));

    if config.embed_armored {
        output.push_str("## Embedded Model\n\n");
        output.push_str(
            "The block below is the complete structured report; decode it to recover the model.\n\n",
        );
        output.push_str(&generate_armored_report(report)?);
        output.push('\n');
    }

    Ok(output)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Reference Instant:** {}\n",
        metadata.as_of.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records Scanned:** {}\n",
        metadata.records_scanned
    ));
    section.push_str(&format!(
        "- **Accounts Retained:** {}\n",
        metadata.accounts_retained
    ));
    section.push_str(&format!("- **Tool Version:** {}\n", metadata.tool_version));
    section.push('\n');

    section
}

/// Generate the aggregate counters section.
fn generate_summary_section(report: &ReportModel) -> String {
    let stats = &report.stats;
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Total | Real Active | Stale | Never Logged In | Locked | Expired Passwords |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| **{}** | {} | {} | {} | {} | {} |\n\n",
        stats.total, stats.real_active, stats.stale, stats.never, stats.locked,
        stats.expired_password
    ));

    section
}

/// Generate the department histogram section.
fn generate_department_section(report: &ReportModel, top_n: usize) -> String {
    if report.stats.departments.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Departments\n\n");
    section.push_str("| Department | Accounts |\n");
    section.push_str("|:---|:---:|\n");

    for dept in report.stats.departments.iter().take(top_n) {
        section.push_str(&format!("| {} | {} |\n", dept.name, dept.count));
    }

    if report.stats.departments.len() > top_n {
        section.push_str(&format!(
            "| _({} more)_ | |\n",
            report.stats.departments.len() - top_n
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-account table.
fn generate_accounts_section(report: &ReportModel) -> String {
    let mut section = String::new();

    section.push_str("## Accounts\n\n");

    if report.accounts.is_empty() {
        section.push_str("No accounts were retained from the export.\n\n");
        return section;
    }

    section.push_str("| # | Username | Display Name | Department | Status | Usage | Password | Admin | Last Logon | Days |\n");
    section.push_str("|:---:|:---|:---|:---|:---|:---|:---|:---:|:---|:---:|\n");

    for account in &report.accounts {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            account.sequence_number,
            account.username,
            account.display_name,
            account.department,
            account.status,
            account.usage_status,
            account.password_status,
            if account.is_admin { "yes" } else { "" },
            account.last_logon_display,
            account.days_display(),
        ));
    }
    section.push('\n');

    section
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
