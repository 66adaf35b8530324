//! Run-wide aggregation over classified accounts.
//!
//! The `Aggregator` is an explicit value folded over the account stream
//! in lock-step with classification; there is no ambient state. Its five
//! flag counters are independent predicates, so one account may bump
//! several at once. Partial aggregators from a partitioned run merge by
//! plain summation before the histogram is finalized.

use std::collections::HashMap;

use crate::models::{Account, AccountStatus, AggregateStats, DepartmentCount, PasswordStatus, UsageStatus};

/// Streaming accumulator for counters and the department histogram.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    total: usize,
    real_active: usize,
    stale: usize,
    never: usize,
    locked: usize,
    expired_password: usize,
    /// (department, count) in first-seen order.
    dept_order: Vec<(String, usize)>,
    /// Department name -> index into `dept_order`.
    dept_index: HashMap<String, usize>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one classified account into the counters and histogram.
    ///
    /// `enabled` is the raw account-control bit: the stale counter gates
    /// on it rather than on `status`, which folds lockout in.
    pub fn observe(&mut self, account: &Account, enabled: bool) {
        self.total += 1;

        if account.usage_status == UsageStatus::ActivePc && account.status == AccountStatus::Enabled
        {
            self.real_active += 1;
        }
        if account.usage_status == UsageStatus::Stale && enabled {
            self.stale += 1;
        }
        if account.usage_status == UsageStatus::NeverLoggedIn {
            self.never += 1;
        }
        if account.status == AccountStatus::Locked {
            self.locked += 1;
        }
        if account.password_status == PasswordStatus::Expired {
            self.expired_password += 1;
        }

        self.bump_department(&account.department, 1);
    }

    /// Merge a partial aggregator from another partition of the input.
    ///
    /// Counter independence makes summation always correct; histogram
    /// entries merge by per-key addition, keeping this aggregator's
    /// first-seen order ahead of the other's.
    pub fn merge(&mut self, other: Aggregator) {
        self.total += other.total;
        self.real_active += other.real_active;
        self.stale += other.stale;
        self.never += other.never;
        self.locked += other.locked;
        self.expired_password += other.expired_password;

        for (department, count) in other.dept_order {
            self.bump_department(&department, count);
        }
    }

    fn bump_department(&mut self, department: &str, count: usize) {
        match self.dept_index.get(department) {
            Some(&index) => self.dept_order[index].1 += count,
            None => {
                self.dept_index
                    .insert(department.to_string(), self.dept_order.len());
                self.dept_order.push((department.to_string(), count));
            }
        }
    }

    /// Finish the run: sort the histogram by count descending with a
    /// first-seen tie-break and produce the immutable stats value.
    ///
    /// The sort is stable over insertion order, so repeated runs on the
    /// same input produce identical orderings. Must only be called after
    /// all partitions are merged.
    pub fn finalize(self) -> AggregateStats {
        let mut entries = self.dept_order;
        entries.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

        AggregateStats {
            total: self.total,
            real_active: self.real_active,
            stale: self.stale,
            never: self.never,
            locked: self.locked,
            expired_password: self.expired_password,
            departments: entries
                .into_iter()
                .map(|(name, count)| DepartmentCount { name, count })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(department: &str, status: AccountStatus, usage: UsageStatus) -> Account {
        Account {
            sequence_number: 0,
            username: "test".to_string(),
            display_name: "test".to_string(),
            email: String::new(),
            department: department.to_string(),
            title: String::new(),
            manager: "-".to_string(),
            description: String::new(),
            created_date: String::new(),
            status,
            usage_status: usage,
            password_status: PasswordStatus::Valid,
            is_admin: false,
            groups: Vec::new(),
            last_logon_display: String::new(),
            days_since_logon: None,
        }
    }

    #[test]
    fn test_empty_aggregator() {
        let stats = Aggregator::new().finalize();
        assert_eq!(stats.total, 0);
        assert!(stats.departments.is_empty());
    }

    #[test]
    fn test_real_active_requires_enabled_status() {
        let mut agg = Aggregator::new();

        agg.observe(
            &account("IT", AccountStatus::Enabled, UsageStatus::ActivePc),
            true,
        );
        agg.observe(
            &account("IT", AccountStatus::Locked, UsageStatus::ActivePc),
            true,
        );
        agg.observe(
            &account("IT", AccountStatus::Disabled, UsageStatus::ActivePc),
            false,
        );

        let stats = agg.finalize();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.real_active, 1);
        assert_eq!(stats.locked, 1);
    }

    #[test]
    fn test_stale_gates_on_enabled_bit() {
        let mut agg = Aggregator::new();

        agg.observe(
            &account("IT", AccountStatus::Enabled, UsageStatus::Stale),
            true,
        );
        // Locked but still enabled underneath: counts as stale.
        agg.observe(
            &account("IT", AccountStatus::Locked, UsageStatus::Stale),
            true,
        );
        agg.observe(
            &account("IT", AccountStatus::Disabled, UsageStatus::Stale),
            false,
        );

        let stats = agg.finalize();
        assert_eq!(stats.stale, 2);
    }

    #[test]
    fn test_never_counts_regardless_of_status() {
        let mut agg = Aggregator::new();

        agg.observe(
            &account("IT", AccountStatus::Disabled, UsageStatus::NeverLoggedIn),
            false,
        );
        agg.observe(
            &account("IT", AccountStatus::Locked, UsageStatus::NeverLoggedIn),
            true,
        );

        assert_eq!(agg.finalize().never, 2);
    }

    #[test]
    fn test_counters_are_independent() {
        // One account that is enabled, never logged in, and expired:
        // three counters move together, the other two stay put.
        let mut acct = account("Finance", AccountStatus::Enabled, UsageStatus::NeverLoggedIn);
        acct.password_status = PasswordStatus::Expired;

        let mut agg = Aggregator::new();
        agg.observe(&acct, true);
        let stats = agg.finalize();

        assert_eq!(stats.total, 1);
        assert_eq!(stats.never, 1);
        assert_eq!(stats.expired_password, 1);
        assert_eq!(stats.real_active, 0);
        assert_eq!(stats.stale, 0);
        assert_eq!(stats.locked, 0);
    }

    #[test]
    fn test_histogram_sorted_with_first_seen_tie_break() {
        let mut agg = Aggregator::new();

        for dept in ["Sales", "IT", "Finance", "IT", "Finance", "IT"] {
            agg.observe(
                &account(dept, AccountStatus::Enabled, UsageStatus::ActivePc),
                true,
            );
        }
        agg.observe(
            &account("Sales", AccountStatus::Enabled, UsageStatus::ActivePc),
            true,
        );

        let stats = agg.finalize();
        let names: Vec<&str> = stats.departments.iter().map(|d| d.name.as_str()).collect();
        let counts: Vec<usize> = stats.departments.iter().map(|d| d.count).collect();

        // IT=3; Sales and Finance tie at 2, Sales was seen first.
        assert_eq!(names, vec!["IT", "Sales", "Finance"]);
        assert_eq!(counts, vec![3, 2, 2]);

        let sum: usize = counts.iter().sum();
        assert_eq!(sum, stats.total);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let accounts: Vec<(Account, bool)> = vec![
            (account("IT", AccountStatus::Enabled, UsageStatus::ActivePc), true),
            (account("Sales", AccountStatus::Locked, UsageStatus::Stale), true),
            (account("IT", AccountStatus::Disabled, UsageStatus::NeverLoggedIn), false),
            (account("Finance", AccountStatus::Enabled, UsageStatus::Infrequent), true),
        ];

        let mut whole = Aggregator::new();
        for (acct, enabled) in &accounts {
            whole.observe(acct, *enabled);
        }

        let mut left = Aggregator::new();
        let mut right = Aggregator::new();
        for (acct, enabled) in &accounts[..2] {
            left.observe(acct, *enabled);
        }
        for (acct, enabled) in &accounts[2..] {
            right.observe(acct, *enabled);
        }
        left.merge(right);

        assert_eq!(whole.finalize(), left.finalize());
    }
}
