//! Record queries
//!
//! Filtering and single-record selection over a full listing. These back the
//! read-only views of the host layer: "all records matching a filter" and
//! "the one record with this name and type".

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{Record, RecordType};

/// Filter criteria for a record listing
///
/// Unset and empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Substring of the record name
    #[serde(default)]
    pub name: Option<String>,
    /// Exact record type
    #[serde(default)]
    pub record_type: Option<RecordType>,
    /// Substring of the record value
    #[serde(default)]
    pub value: Option<String>,
    /// Exact zone
    #[serde(default)]
    pub zone: Option<String>,
}

impl RecordFilter {
    /// Create a filter that matches every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Match record names containing `name`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Match records of exactly this type
    pub fn with_record_type(mut self, record_type: impl Into<RecordType>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Match record values containing `value`
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Match records in exactly this zone
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Check a single record against every set criterion
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(name) = non_empty(&self.name)
            && !record.name.contains(name)
        {
            return false;
        }

        if let Some(record_type) = &self.record_type
            && !record_type.as_str().is_empty()
            && &record.record_type != record_type
        {
            return false;
        }

        if let Some(value) = non_empty(&self.value)
            && !record.value.contains(value)
        {
            return false;
        }

        if let Some(zone) = non_empty(&self.zone)
            && record.zone != zone
        {
            return false;
        }

        true
    }
}

fn non_empty(criterion: &Option<String>) -> Option<&str> {
    criterion.as_deref().filter(|s| !s.is_empty())
}

/// A filtered listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Unix timestamp of the query, so every query result is distinct
    pub id: String,
    /// Matching records, in upstream order
    pub records: Vec<Record>,
}

/// Keep the records matching `filter`, preserving order
pub fn filter_records(records: Vec<Record>, filter: &RecordFilter) -> QueryResult {
    let records = records
        .into_iter()
        .filter(|record| filter.matches(record))
        .collect();

    QueryResult {
        id: Utc::now().timestamp().to_string(),
        records,
    }
}

/// Select the single record with this name and type
///
/// With `value`, the first exact value match wins. Without it, more than
/// one candidate is an error: the caller has to disambiguate.
///
/// # Returns
///
/// - `Ok(Record)`: The selected record
/// - `Err(Error::NotFound)`: Nothing matched
/// - `Err(Error::Ambiguous)`: Several records matched and no value was given
pub fn find_unique(
    records: &[Record],
    name: &str,
    record_type: &RecordType,
    value: Option<&str>,
) -> Result<Record> {
    let mut candidates = records
        .iter()
        .filter(|r| r.name == name && &r.record_type == record_type);

    let found = match value {
        Some(value) => candidates.find(|r| r.value == value),
        None => {
            let first = candidates.next();
            if first.is_some() && candidates.next().is_some() {
                return Err(Error::ambiguous(format!(
                    "multiple DNS records found for {} (type: {}). Please specify 'value' to disambiguate",
                    name, record_type
                )));
            }
            first
        }
    };

    match (found, value) {
        (Some(record), _) => Ok(record.clone()),
        (None, Some(value)) => Err(Error::not_found(format!(
            "{} (type: {}, value: {})",
            name, record_type, value
        ))),
        (None, None) => Err(Error::not_found(format!("{} (type: {})", name, record_type))),
    }
}
