//! Account classification and aggregation engine.
//!
//! One sequential forward pass over the raw record stream: normalize,
//! resolve groups, classify, aggregate. Encounter order defines the
//! 1-based sequence numbers and the histogram's first-seen tie-break, so
//! records are never revisited.

pub mod aggregate;
pub mod classify;
pub mod groups;
pub mod normalize;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::RuleConfig;
use crate::directory::RawAccountRecord;
use crate::models::{Account, AggregateStats};

use aggregate::Aggregator;

/// Result of one engine pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    /// Classified accounts in encounter order.
    pub accounts: Vec<Account>,
    /// Finalized run-wide statistics.
    pub stats: AggregateStats,
    /// Raw records consumed, including filtered ones.
    pub records_scanned: usize,
}

/// Run the full classification and aggregation pass.
///
/// Consumes the one-shot record sequence exactly once. Filtered
/// service-account records are invisible to every counter; everything
/// else becomes exactly one `Account` and one `observe` call.
pub fn run_pass<I>(records: I, rules: &RuleConfig, as_of: DateTime<Utc>) -> PassOutcome
where
    I: IntoIterator<Item = RawAccountRecord>,
{
    let mut aggregator = Aggregator::new();
    let mut accounts: Vec<Account> = Vec::new();
    let mut records_scanned = 0;

    for record in records {
        records_scanned += 1;

        let Some(normalized) = normalize::normalize(record, rules) else {
            continue;
        };

        let resolved_groups = groups::resolve_groups(normalized.record());
        let classification = classify::classify(normalized.record(), &resolved_groups, rules, as_of);

        let account = Account {
            sequence_number: accounts.len() + 1,
            username: normalized.username,
            display_name: normalized.display_name,
            email: normalized.email,
            department: normalized.department,
            title: normalized.title,
            manager: normalized.manager,
            description: normalized.description,
            created_date: normalized.created_date,
            status: classification.status,
            usage_status: classification.usage_status,
            password_status: classification.password_status,
            is_admin: classification.is_admin,
            groups: resolved_groups,
            last_logon_display: classification.last_logon_display,
            days_since_logon: classification.days_since_logon,
        };

        aggregator.observe(&account, classification.enabled);
        accounts.push(account);
    }

    debug!(
        "Pass complete: {} records scanned, {} accounts retained",
        records_scanned,
        accounts.len()
    );

    PassOutcome {
        accounts,
        stats: aggregator.finalize(),
        records_scanned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::record;
    use crate::models::{AccountStatus, PasswordStatus, UsageStatus};
    use chrono::{Duration, TimeZone};
    use super::classify::encode_filetime;
    use serde_json::json;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap()
    }

    fn rules() -> RuleConfig {
        RuleConfig::default()
    }

    fn run(records: Vec<serde_json::Value>) -> PassOutcome {
        run_pass(records.into_iter().map(record), &rules(), as_of())
    }

    #[test]
    fn test_empty_input() {
        let outcome = run(vec![]);
        assert_eq!(outcome.records_scanned, 0);
        assert!(outcome.accounts.is_empty());
        assert_eq!(outcome.stats.total, 0);
    }

    // Enabled account, recent logon, no lockout, no expiry attribute.
    #[test]
    fn test_enabled_recent_logon() {
        let outcome = run(vec![json!({
            "sAMAccountName": "jdoe",
            "userAccountControl": 512,
            "lastLogonTimestamp": encode_filetime(as_of() - Duration::days(10)),
        })]);

        let account = &outcome.accounts[0];
        assert_eq!(account.status, AccountStatus::Enabled);
        assert_eq!(account.usage_status, UsageStatus::ActivePc);
        assert_eq!(account.password_status, PasswordStatus::Valid);

        assert_eq!(outcome.stats.real_active, 1);
        assert_eq!(outcome.stats.stale, 0);
        assert_eq!(outcome.stats.never, 0);
        assert_eq!(outcome.stats.locked, 0);
        assert_eq!(outcome.stats.expired_password, 0);
    }

    // Enabled account, 200-day-old logon.
    #[test]
    fn test_enabled_stale_logon() {
        let outcome = run(vec![json!({
            "sAMAccountName": "jdoe",
            "lastLogonTimestamp": encode_filetime(as_of() - Duration::days(200)),
        })]);

        assert_eq!(outcome.accounts[0].usage_status, UsageStatus::Stale);
        assert_eq!(outcome.stats.stale, 1);
        assert_eq!(outcome.stats.real_active, 0);
    }

    // Logon decoding ten years into the future: sentinel, not a logon.
    #[test]
    fn test_corrupted_future_logon() {
        let outcome = run(vec![json!({
            "sAMAccountName": "svc-scan",
            "lastLogonTimestamp": encode_filetime(as_of() + Duration::days(3653)),
        })]);

        let account = &outcome.accounts[0];
        assert_eq!(account.usage_status, UsageStatus::ActiveSystem);
        assert_eq!(account.days_since_logon, None);

        assert_eq!(outcome.stats.real_active, 0);
        assert_eq!(outcome.stats.stale, 0);
    }

    // Primary group 512 with no literal memberships.
    #[test]
    fn test_primary_group_admin() {
        let outcome = run(vec![json!({
            "sAMAccountName": "da-root",
            "primaryGroupID": 512,
        })]);

        let account = &outcome.accounts[0];
        assert!(account.is_admin);
        assert_eq!(account.groups, vec!["Domain Admins"]);
    }

    // Service-account noise is invisible to every stage and counter.
    #[test]
    fn test_service_account_excluded() {
        let outcome = run(vec![
            json!({ "sAMAccountName": "HealthMailbox12" }),
            json!({ "sAMAccountName": "jdoe" }),
        ]);

        assert_eq!(outcome.records_scanned, 2);
        assert_eq!(outcome.accounts.len(), 1);
        assert_eq!(outcome.stats.total, 1);
        assert_eq!(outcome.accounts[0].username, "jdoe");
        assert_eq!(outcome.accounts[0].sequence_number, 1);
    }

    // Expired password increments the counter.
    #[test]
    fn test_expired_password() {
        let outcome = run(vec![json!({
            "sAMAccountName": "jdoe",
            "msDS-UserPasswordExpiryTimeComputed": encode_filetime(as_of() - Duration::days(5)),
        })]);

        assert_eq!(
            outcome.accounts[0].password_status,
            PasswordStatus::Expired
        );
        assert_eq!(outcome.stats.expired_password, 1);
    }

    #[test]
    fn test_one_account_moves_several_counters() {
        // Enabled + never logged in + expired password: total, never, and
        // expired_password all move; real_active and stale do not.
        let outcome = run(vec![json!({
            "sAMAccountName": "jdoe",
            "userAccountControl": 512,
            "msDS-UserPasswordExpiryTimeComputed": encode_filetime(as_of() - Duration::days(1)),
        })]);

        assert_eq!(outcome.stats.total, 1);
        assert_eq!(outcome.stats.never, 1);
        assert_eq!(outcome.stats.expired_password, 1);
        assert_eq!(outcome.stats.real_active, 0);
        assert_eq!(outcome.stats.stale, 0);
        assert_eq!(outcome.stats.locked, 0);
    }

    #[test]
    fn test_sequence_numbers_and_histogram_sum() {
        let outcome = run(vec![
            json!({ "sAMAccountName": "a", "department": "IT" }),
            json!({ "sAMAccountName": "SM_sys" }),
            json!({ "sAMAccountName": "b", "department": "Sales" }),
            json!({ "sAMAccountName": "c" }),
        ]);

        let seq: Vec<usize> = outcome.accounts.iter().map(|a| a.sequence_number).collect();
        assert_eq!(seq, vec![1, 2, 3]);

        let histogram_sum: usize = outcome.stats.departments.iter().map(|d| d.count).sum();
        assert_eq!(histogram_sum, outcome.stats.total);

        // Missing department lands in the "Unknown" bucket.
        assert!(outcome
            .stats
            .departments
            .iter()
            .any(|d| d.name == "Unknown" && d.count == 1));
    }

    #[test]
    fn test_each_account_has_exactly_one_of_each_classification() {
        let outcome = run(vec![
            json!({ "sAMAccountName": "a", "userAccountControl": 514 }),
            json!({
                "sAMAccountName": "b",
                "lockoutTime": 1,
                "lastLogonTimestamp": encode_filetime(as_of() - Duration::days(30)),
            }),
        ]);

        // Enum-typed fields make exclusivity structural; spot-check the
        // priority rule: lockout beats the enabled bit.
        assert_eq!(outcome.accounts[0].status, AccountStatus::Disabled);
        assert_eq!(outcome.accounts[1].status, AccountStatus::Locked);
        assert_eq!(outcome.accounts[1].usage_status, UsageStatus::ActivePc);
        assert_eq!(outcome.stats.real_active, 0);
        assert_eq!(outcome.stats.locked, 1);
    }

    #[test]
    fn test_pass_is_deterministic() {
        let records = || {
            vec![
                json!({ "sAMAccountName": "a", "department": "IT" }),
                json!({ "sAMAccountName": "b", "department": "Sales" }),
                json!({ "sAMAccountName": "c", "department": "IT" }),
            ]
        };

        let first = run(records());
        let second = run(records());

        assert_eq!(first.accounts, second.accounts);
        assert_eq!(first.stats, second.stats);
    }
}
