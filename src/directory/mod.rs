//! Input collaborator: raw account records from a directory export.
//!
//! The auditor consumes a JSON export of directory accounts (an array of
//! objects keyed by directory attribute names). Live connection, query
//! filtering, and paging belong to whatever produced the export; this
//! module only opens it, validates its shape, and yields records in file
//! order, exactly once per run.

use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Well-known directory attribute names consumed by the engine.
pub mod attr {
    pub const USERNAME: &str = "sAMAccountName";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const EMAIL: &str = "mail";
    pub const DEPARTMENT: &str = "department";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const MANAGER: &str = "manager";
    pub const ACCOUNT_CONTROL: &str = "userAccountControl";
    pub const LOCKOUT_TIME: &str = "lockoutTime";
    pub const LAST_LOGON: &str = "lastLogonTimestamp";
    pub const PASSWORD_EXPIRY: &str = "msDS-UserPasswordExpiryTimeComputed";
    pub const PRIMARY_GROUP_ID: &str = "primaryGroupID";
    pub const MEMBER_OF: &str = "memberOf";
    pub const WHEN_CREATED: &str = "whenCreated";
}

/// Errors raised while obtaining the input record sequence.
///
/// Any of these is fatal for the whole run: no partial report is ever
/// assembled from an export that could not be read in full.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read account export {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse account export {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("account export {path} is not a JSON array of record objects")]
    Shape { path: String },
}

/// A raw, sparsely-populated account record.
///
/// Every attribute is optional and possibly multi-valued. All extraction
/// goes through [`RawAccountRecord::first`], the single boundary that
/// reduces a multi-valued attribute to its first value; classification
/// logic never inspects the JSON shape directly.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAccountRecord {
    attrs: Map<String, Value>,
}

impl RawAccountRecord {
    pub fn new(attrs: Map<String, Value>) -> Self {
        Self { attrs }
    }

    /// First value of a possibly multi-valued attribute.
    ///
    /// A scalar attribute is its own first value; an array attribute
    /// yields its first element; an empty array or absent attribute
    /// yields `None`.
    pub fn first(&self, name: &str) -> Option<&Value> {
        match self.attrs.get(name) {
            Some(Value::Array(values)) => values.first(),
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// First value of an attribute as a string slice.
    pub fn first_str(&self, name: &str) -> Option<&str> {
        self.first(name).and_then(Value::as_str)
    }

    /// First value of an attribute as a 64-bit integer.
    ///
    /// Directory exports carry large tick timestamps either as JSON
    /// numbers or as decimal strings; both forms are accepted. Anything
    /// unparsable resolves to `None`, never an error.
    pub fn first_i64(&self, name: &str) -> Option<i64> {
        match self.first(name) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// All string values of an attribute, in declaration order.
    pub fn str_values(&self, name: &str) -> Vec<&str> {
        match self.attrs.get(name) {
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }
}

/// A one-shot source of raw account records backed by a JSON export file.
///
/// The file is read and validated eagerly so that any failure aborts the
/// run before classification or aggregation begins. Iteration consumes
/// the source; the sequence is not restartable.
#[derive(Debug)]
pub struct JsonRecordSource {
    records: Vec<RawAccountRecord>,
}

impl JsonRecordSource {
    /// Open and parse an account export file.
    pub fn open(path: &Path) -> Result<Self, DirectoryError> {
        let path_display = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path_display.clone(),
            source,
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|source| DirectoryError::Parse {
                path: path_display.clone(),
                source,
            })?;

        let Value::Array(entries) = value else {
            return Err(DirectoryError::Shape { path: path_display });
        };

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Value::Object(attrs) => records.push(RawAccountRecord::new(attrs)),
                _ => return Err(DirectoryError::Shape { path: path_display }),
            }
        }

        debug!("Loaded {} raw records from {}", records.len(), path_display);
        Ok(Self { records })
    }

    /// Number of raw records in the export.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for JsonRecordSource {
    type Item = RawAccountRecord;
    type IntoIter = std::vec::IntoIter<RawAccountRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Builds a record from a `serde_json::json!` object literal (test helper).
#[cfg(test)]
pub(crate) fn record(value: Value) -> RawAccountRecord {
    match value {
        Value::Object(attrs) => RawAccountRecord::new(attrs),
        _ => panic!("test record must be a JSON object"),
    }
}
