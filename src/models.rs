//! Data models for the account auditor.
//!
//! This module contains all the core data structures used throughout
//! the application for representing classified accounts, aggregate
//! statistics, and the final report model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enabled/disabled/locked state of an account.
///
/// Mutually exclusive; lockout takes priority over the enabled bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account is enabled and not locked out.
    Enabled,
    /// Account is disabled via the account-control bitmask.
    Disabled,
    /// Account is currently locked out.
    Locked,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Enabled => write!(f, "Enabled"),
            AccountStatus::Disabled => write!(f, "Disabled"),
            AccountStatus::Locked => write!(f, "Locked"),
        }
    }
}

/// Logon recency classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageStatus {
    /// Interactive logon within the active window (default 60 days).
    ActivePc,
    /// Logon between the active and stale thresholds.
    Infrequent,
    /// No logon within the stale window (default 180 days).
    Stale,
    /// No logon timestamp recorded at all.
    NeverLoggedIn,
    /// Logon timestamp decodes to an implausible future year; treated as
    /// a non-interactive/system artifact rather than a real logon.
    ActiveSystem,
}

impl fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageStatus::ActivePc => write!(f, "Active (PC)"),
            UsageStatus::Infrequent => write!(f, "Infrequent"),
            UsageStatus::Stale => write!(f, "Stale"),
            UsageStatus::NeverLoggedIn => write!(f, "Never Logged In"),
            UsageStatus::ActiveSystem => write!(f, "Active (System)"),
        }
    }
}

/// Password expiry classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStatus {
    /// Password has not expired (or expiry is unknown).
    Valid,
    /// Password expiry timestamp lies in the past.
    Expired,
}

impl fmt::Display for PasswordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordStatus::Valid => write!(f, "Valid"),
            PasswordStatus::Expired => write!(f, "Expired"),
        }
    }
}

/// A fully classified account, immutable once built.
///
/// One `Account` is produced per raw record that survives the
/// service-account filter; classification fields are terminal at
/// construction time and never revisited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// 1-based position among retained accounts, in encounter order.
    pub sequence_number: usize,
    /// Logon name (may be empty for malformed records).
    pub username: String,
    /// Display name; falls back to the username when absent.
    pub display_name: String,
    pub email: String,
    /// Department; defaults to "Unknown" when absent.
    pub department: String,
    pub title: String,
    /// Manager display name reduced from the directory reference, or "-".
    pub manager: String,
    pub description: String,
    pub created_date: String,
    pub status: AccountStatus,
    pub usage_status: UsageStatus,
    pub password_status: PasswordStatus,
    pub is_admin: bool,
    /// Resolved group names in insertion order; duplicates are preserved.
    pub groups: Vec<String>,
    /// Human-readable last-logon column ("Never" / date / "Unknown").
    pub last_logon_display: String,
    /// Whole days since last logon; `None` when unknown or withheld.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_logon: Option<i64>,
}

impl Account {
    /// Returns the day count as a display string, or "-" when withheld.
    pub fn days_display(&self) -> String {
        match self.days_since_logon {
            Some(days) => days.to_string(),
            None => "-".to_string(),
        }
    }
}

/// One department histogram entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub name: String,
    pub count: usize,
}

/// Run-wide statistics accumulated across all retained accounts.
///
/// The five flag counters are independent predicates, not a partition:
/// a single account can contribute to several of them at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Number of accounts surviving the service-account filter.
    pub total: usize,
    /// Enabled accounts with a logon inside the active window.
    pub real_active: usize,
    /// Enabled accounts with no logon inside the stale window.
    pub stale: usize,
    /// Accounts with no recorded logon at all.
    pub never: usize,
    /// Accounts currently locked out.
    pub locked: usize,
    /// Accounts whose password has expired.
    pub expired_password: usize,
    /// Histogram sorted by count descending, ties in first-seen order.
    pub departments: Vec<DepartmentCount>,
}

/// Metadata about the audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the record export that was audited.
    pub source: String,
    /// Wall-clock instant the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Reference instant all recency math was evaluated against.
    pub as_of: DateTime<Utc>,
    /// Tool version that produced the report.
    pub tool_version: String,
    /// Raw records read from the source, including filtered ones.
    pub records_scanned: usize,
    /// Accounts retained after the service-account filter.
    pub accounts_retained: usize,
}

/// The complete audit report handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportModel {
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// Classified accounts in encounter order.
    pub accounts: Vec<Account>,
    /// Run-wide counters and the department histogram.
    pub stats: AggregateStats,
    /// Department labels ordered consistently with `stats.departments`,
    /// parallel to `department_counts`.
    pub department_labels: Vec<String>,
    /// Department counts, parallel to `department_labels`.
    pub department_counts: Vec<usize>,
}
