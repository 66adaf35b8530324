//! Record normalization: noise filtering and field defaults.
//!
//! First stage of the pipeline. Service/system accounts are dropped
//! entirely (they are invisible to every later stage and counter) and
//! every optional field of a retained record resolves to a documented
//! default, so downstream stages never deal with absence.

use crate::config::RuleConfig;
use crate::directory::{attr, RawAccountRecord};

use super::groups::dn_leaf;

/// Fallback department label for records without one.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// Placeholder for an absent manager reference.
pub const NO_MANAGER: &str = "-";

/// A retained record with its display fields defaulted.
///
/// The raw record is kept alongside so the classification stage can read
/// the attributes (bitmask, timestamps, memberships) it cares about.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub department: String,
    pub title: String,
    pub manager: String,
    pub description: String,
    pub created_date: String,
    record: RawAccountRecord,
}

impl NormalizedRecord {
    /// The underlying raw record, for attribute-level classification.
    pub fn record(&self) -> &RawAccountRecord {
        &self.record
    }
}

/// True when the username matches one of the excluded service-account
/// prefixes (case-insensitive prefix match).
pub fn is_service_account(username: &str, excluded_prefixes: &[String]) -> bool {
    let lower = username.to_lowercase();
    excluded_prefixes
        .iter()
        .any(|prefix| lower.starts_with(&prefix.to_lowercase()))
}

/// Normalize one raw record, or drop it when it matches the noise filter.
///
/// A record without a username is retained with an empty username; no
/// missing attribute is ever an error here.
pub fn normalize(record: RawAccountRecord, rules: &RuleConfig) -> Option<NormalizedRecord> {
    let username = record.first_str(attr::USERNAME).unwrap_or("").to_string();

    if is_service_account(&username, &rules.excluded_prefixes) {
        return None;
    }

    let display_name = record
        .first_str(attr::DISPLAY_NAME)
        .filter(|s| !s.is_empty())
        .unwrap_or(&username)
        .to_string();

    let department = record
        .first_str(attr::DEPARTMENT)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_DEPARTMENT)
        .to_string();

    let manager = record
        .first_str(attr::MANAGER)
        .filter(|s| !s.is_empty())
        .map(dn_leaf)
        .unwrap_or_else(|| NO_MANAGER.to_string());

    Some(NormalizedRecord {
        email: record.first_str(attr::EMAIL).unwrap_or("").to_string(),
        title: record.first_str(attr::TITLE).unwrap_or("").to_string(),
        description: record
            .first_str(attr::DESCRIPTION)
            .unwrap_or("")
            .to_string(),
        created_date: record
            .first_str(attr::WHEN_CREATED)
            .unwrap_or("")
            .to_string(),
        username,
        display_name,
        department,
        manager,
        record,
    })
}
