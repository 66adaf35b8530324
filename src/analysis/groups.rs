//! Group membership resolution.
//!
//! Flattens literal membership references into plain group names and
//! injects the well-known primary group where applicable. Only direct
//! membership is inspected; nested group graphs are never walked here.
//! If effective (recursive) membership is ever needed, it belongs in the
//! export producer as a precomputed attribute, not in this stage.

use crate::directory::{attr, RawAccountRecord};

/// Well-known primary-group id of the Domain Admins group.
pub const DOMAIN_ADMINS_GROUP_ID: i64 = 512;

/// Name synthesized for accounts whose primary group is 512.
pub const DOMAIN_ADMINS_NAME: &str = "Domain Admins";

/// Leading path component of a distinguished name, with the `CN=` marker
/// stripped.
///
/// `"CN=Domain Admins,CN=Users,DC=corp"` becomes `"Domain Admins"`. A
/// string without commas or marker is returned trimmed and otherwise
/// unchanged.
pub fn dn_leaf(dn: &str) -> String {
    let first = dn.split(',').next().unwrap_or(dn).trim();
    match first.get(..3) {
        Some(marker) if marker.eq_ignore_ascii_case("CN=") => first[3..].to_string(),
        _ => first.to_string(),
    }
}

/// Resolve the ordered group-name list for one account.
///
/// Literal membership references come first, in declaration order. An
/// account whose primary-group id is 512 additionally gets
/// "Domain Admins" appended, even when a literal reference already names
/// it; duplicates are deliberately preserved.
pub fn resolve_groups(record: &RawAccountRecord) -> Vec<String> {
    let mut groups: Vec<String> = record
        .str_values(attr::MEMBER_OF)
        .into_iter()
        .map(dn_leaf)
        .collect();

    if record.first_i64(attr::PRIMARY_GROUP_ID) == Some(DOMAIN_ADMINS_GROUP_ID) {
        groups.push(DOMAIN_ADMINS_NAME.to_string());
    }

    groups
}
