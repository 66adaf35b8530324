//! Per-account classification: status, usage recency, password expiry,
//! and administrative privilege.
//!
//! All time math runs against a single reference instant (`as_of`) so a
//! run is reproducible when that instant is pinned. Timestamps arrive as
//! tick counts (100-nanosecond intervals since 1601-01-01 UTC); anything
//! unparsable degrades to the documented default classification instead
//! of failing the batch.

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::config::RuleConfig;
use crate::directory::{attr, RawAccountRecord};
use crate::models::{AccountStatus, PasswordStatus, UsageStatus};

use super::groups::DOMAIN_ADMINS_GROUP_ID;

/// Seconds between the tick epoch (1601-01-01) and the Unix epoch.
const TICK_EPOCH_TO_UNIX_SECS: i64 = 11_644_473_600;

/// Ticks (100ns intervals) per second.
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Account-control bit marking a disabled account.
const UAC_ACCOUNT_DISABLED: i64 = 0x2;

/// Account-control value of a normal enabled account; assumed when the
/// attribute is absent.
const UAC_NORMAL_ACCOUNT: i64 = 0x200;

/// Last-logon column shown for accounts with no recorded logon.
const NEVER_DISPLAY: &str = "Never";

/// Last-logon column shown when the timestamp is corrupted or withheld.
const UNKNOWN_DISPLAY: &str = "Unknown";

/// Everything the classification engine derives for one account.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status: AccountStatus,
    /// Raw enabled bit, independent of lockout. `status` folds lockout
    /// in; the stale counter gates on this flag alone.
    pub enabled: bool,
    pub usage_status: UsageStatus,
    pub password_status: PasswordStatus,
    pub is_admin: bool,
    pub last_logon_display: String,
    pub days_since_logon: Option<i64>,
}

/// Decode a tick timestamp into a UTC instant.
///
/// Non-positive counts mean "not set". The never-expires sentinel
/// `0x7FFF_FFFF_FFFF_FFFF` decodes to a far-future instant (around year
/// 30828); callers handle implausible years through the corrupted-year
/// guard or the expiry comparison rather than here.
pub fn decode_filetime(ticks: i64) -> Option<DateTime<Utc>> {
    if ticks <= 0 {
        return None;
    }
    let secs = ticks / TICKS_PER_SECOND - TICK_EPOCH_TO_UNIX_SECS;
    Utc.timestamp_opt(secs, 0).single()
}

/// Classify one normalized record.
pub fn classify(
    record: &RawAccountRecord,
    groups: &[String],
    rules: &RuleConfig,
    as_of: DateTime<Utc>,
) -> Classification {
    let uac = record
        .first_i64(attr::ACCOUNT_CONTROL)
        .unwrap_or(UAC_NORMAL_ACCOUNT);
    let enabled = uac & UAC_ACCOUNT_DISABLED == 0;

    let locked = record
        .first_i64(attr::LOCKOUT_TIME)
        .is_some_and(|t| t > 0);

    // Lockout wins over the enabled bit.
    let status = if locked {
        AccountStatus::Locked
    } else if enabled {
        AccountStatus::Enabled
    } else {
        AccountStatus::Disabled
    };

    let (usage_status, last_logon_display, days_since_logon) = classify_usage(record, rules, as_of);

    Classification {
        status,
        enabled,
        usage_status,
        password_status: classify_password(record, as_of),
        is_admin: detect_admin(record, groups, rules),
        last_logon_display,
        days_since_logon,
    }
}

/// Derive the usage bucket, display column, and day count.
fn classify_usage(
    record: &RawAccountRecord,
    rules: &RuleConfig,
    as_of: DateTime<Utc>,
) -> (UsageStatus, String, Option<i64>) {
    let Some(logon) = record
        .first_i64(attr::LAST_LOGON)
        .and_then(decode_filetime)
    else {
        return (UsageStatus::NeverLoggedIn, NEVER_DISPLAY.to_string(), None);
    };

    // Some replication paths write garbage far-future timestamps for
    // accounts that authenticate through system channels. Such values are
    // sentinel data, not logons: no day count, no active/stale counting.
    if logon.year() > as_of.year() + rules.future_year_slack {
        return (UsageStatus::ActiveSystem, UNKNOWN_DISPLAY.to_string(), None);
    }

    let display = logon.format("%Y-%m-%d").to_string();
    let diff = (as_of.date_naive() - logon.date_naive()).num_days();

    // A moderately-future logon date is not caught by the guard above; it
    // falls through the normal buckets but the day count is withheld.
    let days = if diff >= 0 { Some(diff) } else { None };

    let usage = if diff <= rules.active_days {
        UsageStatus::ActivePc
    } else if diff <= rules.stale_days {
        UsageStatus::Infrequent
    } else {
        UsageStatus::Stale
    };

    (usage, display, days)
}

/// Expired iff the expiry timestamp is present, decodable, and in the past.
fn classify_password(record: &RawAccountRecord, as_of: DateTime<Utc>) -> PasswordStatus {
    match record
        .first_i64(attr::PASSWORD_EXPIRY)
        .and_then(decode_filetime)
    {
        Some(expiry) if expiry < as_of => PasswordStatus::Expired,
        _ => PasswordStatus::Valid,
    }
}

/// Direct-membership admin detection against the configured rule tables.
///
/// True when the primary group is Domain Admins, any resolved group name
/// equals a configured admin group, or any name contains a configured
/// marker substring. Matching is case-insensitive throughout.
fn detect_admin(record: &RawAccountRecord, groups: &[String], rules: &RuleConfig) -> bool {
    if record.first_i64(attr::PRIMARY_GROUP_ID) == Some(DOMAIN_ADMINS_GROUP_ID) {
        return true;
    }

    groups.iter().any(|group| {
        let lower = group.to_lowercase();
        rules
            .admin_group_names
            .iter()
            .any(|name| lower == name.to_lowercase())
            || rules
                .admin_markers
                .iter()
                .any(|marker| lower.contains(&marker.to_lowercase()))
    })
}

/// Encode a UTC instant as a tick timestamp (test helper).
#[cfg(test)]
pub(crate) fn encode_filetime(at: DateTime<Utc>) -> i64 {
    (at.timestamp() + TICK_EPOCH_TO_UNIX_SECS) * TICKS_PER_SECOND
}
