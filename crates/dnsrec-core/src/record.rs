//! DNS record model
//!
//! [`Record`] is what the upstream API lists; [`RecordInput`] is the
//! `(name, type, value)` triple used to ask for an add, a remove or a lookup.
//!
//! Lookups compare values with a single trailing-dot tolerance: upstream
//! stores hostname-valued records (CNAME and friends) as FQDNs even when the
//! caller omitted the final ".".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of `|`-separated parts in a record ID
const ID_PARTS: usize = 3;

/// DNS record type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Mail exchanger
    Mx,
    /// Name server
    Ns,
    /// Pointer
    Ptr,
    /// Free text
    Txt,
    /// Service locator
    Srv,
    /// Naming authority pointer
    Naptr,
    /// Any type this crate has no special handling for
    Other(String),
}

impl RecordType {
    /// The upstream spelling of this type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Naptr => "NAPTR",
            RecordType::Other(other) => other,
        }
    }

    /// Whether the value of this type is a hostname
    pub fn is_hostname_valued(&self) -> bool {
        matches!(self, RecordType::Cname | RecordType::Ns | RecordType::Ptr)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "PTR" => RecordType::Ptr,
            "TXT" => RecordType::Txt,
            "SRV" => RecordType::Srv,
            "NAPTR" => RecordType::Naptr,
            _ => RecordType::Other(value),
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        RecordType::from(value.to_string())
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(RecordType::from(s))
    }
}

/// A DNS record as listed by the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record name (e.g. "www.example.com")
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record value
    pub value: String,
    /// Zone the record lives in
    pub zone: String,
    /// Free-form comment attached upstream
    pub comment: String,
    /// Account owning the record
    pub account_id: String,
    /// Whether upstream allows the record to be changed
    pub editable: bool,
}

impl Record {
    /// Whether this record has the identity described by `input`
    ///
    /// Name and type must match exactly; the value may differ by one
    /// trailing dot in either direction.
    pub fn matches(&self, input: &RecordInput) -> bool {
        self.name == input.name
            && self.record_type == input.record_type
            && values_match(&self.value, &input.value)
    }

    /// The identity triple of this record
    pub fn to_input(&self) -> RecordInput {
        RecordInput::new(self.name.clone(), self.record_type.clone(), self.value.clone())
    }
}

/// Identity triple used to add, remove or look up a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordInput {
    /// Record name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record value
    pub value: String,
}

impl RecordInput {
    /// Create a new record input
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<RecordType>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            value: value.into(),
        }
    }

    /// Encode as a stable record ID: `TYPE|name|value`
    pub fn to_id(&self) -> String {
        format!("{}|{}|{}", self.record_type, self.name, self.value)
    }

    /// Decode a record ID produced by [`RecordInput::to_id`]
    pub fn from_id(id: &str) -> Result<Self> {
        let parts: Vec<&str> = id.split('|').collect();
        if parts.len() != ID_PARTS {
            return Err(Error::invalid_input(
                "could not determine record from input ID",
            ));
        }
        Ok(Self::new(parts[1], parts[0], parts[2]))
    }
}

impl fmt::Display for RecordInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.record_type, self.value)
    }
}

/// Compare two record values allowing one trailing "." on either side
pub fn values_match(stored: &str, wanted: &str) -> bool {
    if stored == wanted {
        return true;
    }
    stored.strip_suffix('.') == Some(wanted) || wanted.strip_suffix('.') == Some(stored)
}
