//! Record input validation
//!
//! Stateless format checks applied before a record is sent upstream.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{Error, Result};
use crate::record::{RecordInput, RecordType};

/// Longest accepted record name or hostname
const MAX_NAME_LEN: usize = 255;

/// Longest accepted hostname label
const MAX_LABEL_LEN: usize = 63;

/// Longest accepted TXT value
const MAX_TXT_LEN: usize = 255;

/// Validate a full record input: name first, then the value for its type
pub fn validate_input(input: &RecordInput) -> Result<()> {
    validate_record_name(&input.name)?;
    validate_value(&input.record_type, &input.value)
}

/// Validate a DNS record name
///
/// 1 to 255 characters, alphanumeric at both ends, alphanumerics, `-` and
/// `.` in between.
pub fn validate_record_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(Error::invalid_input(format!(
            "record name must be between 1 and {} characters, got {}",
            MAX_NAME_LEN,
            name.len()
        )));
    }

    let bytes = name.as_bytes();
    let edges_ok = bytes[0].is_ascii_alphanumeric() && bytes[bytes.len() - 1].is_ascii_alphanumeric();
    let body_ok = bytes
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.');

    if !edges_ok || !body_ok {
        return Err(Error::invalid_input(format!(
            "must be a valid DNS hostname, got: {}",
            name
        )));
    }

    Ok(())
}

/// Validate a record value against the rules of its type
///
/// Types without specific rules are accepted as-is.
pub fn validate_value(record_type: &RecordType, value: &str) -> Result<()> {
    match record_type {
        RecordType::A => validate_ipv4(value),
        RecordType::Aaaa => validate_ipv6(value),
        RecordType::Cname | RecordType::Ns | RecordType::Ptr => {
            if value != "@" && !is_valid_hostname(value) {
                return Err(Error::invalid_input(format!(
                    "{} record value must be a valid hostname or '@', got: {}",
                    record_type, value
                )));
            }
            Ok(())
        }
        RecordType::Mx => validate_mx(value),
        RecordType::Txt => validate_txt(value),
        RecordType::Srv => validate_srv(value),
        RecordType::Naptr | RecordType::Other(_) => Ok(()),
    }
}

fn validate_ipv4(value: &str) -> Result<()> {
    value
        .parse::<Ipv4Addr>()
        .map(|_| ())
        .map_err(|_| Error::invalid_input(format!("{} is not a valid IPv4 address", value)))
}

fn validate_ipv6(value: &str) -> Result<()> {
    value
        .parse::<Ipv6Addr>()
        .map(|_| ())
        .map_err(|_| Error::invalid_input(format!("{} is not a valid IPv6 address", value)))
}

fn validate_txt(value: &str) -> Result<()> {
    if value.len() > MAX_TXT_LEN {
        return Err(Error::invalid_input(format!(
            "TXT record value must be at most {} characters, got {}",
            MAX_TXT_LEN,
            value.len()
        )));
    }
    Ok(())
}

/// MX: `priority hostname`
fn validate_mx(value: &str) -> Result<()> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(Error::invalid_input(format!(
            "MX record must be in format 'priority hostname', got: {}",
            value
        )));
    }

    parse_u16_field("MX priority", parts[0])?;

    if !is_valid_hostname(parts[1]) {
        return Err(Error::invalid_input(format!(
            "MX hostname is not valid: {}",
            parts[1]
        )));
    }
    Ok(())
}

/// SRV: `priority weight port target`
fn validate_srv(value: &str) -> Result<()> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 4 {
        return Err(Error::invalid_input(format!(
            "SRV record must be in format 'priority weight port target', got: {}",
            value
        )));
    }

    parse_u16_field("SRV priority", parts[0])?;
    parse_u16_field("SRV weight", parts[1])?;
    parse_u16_field("SRV port", parts[2])?;

    if !is_valid_hostname(parts[3]) {
        return Err(Error::invalid_input(format!(
            "SRV target hostname is not valid: {}",
            parts[3]
        )));
    }
    Ok(())
}

/// Parse a numeric field that must lie in 0..=65535
fn parse_u16_field(field: &str, raw: &str) -> Result<u16> {
    let number: i64 = raw
        .parse()
        .map_err(|_| Error::invalid_input(format!("{} must be a number, got: {}", field, raw)))?;

    u16::try_from(number).map_err(|_| {
        Error::invalid_input(format!(
            "{} must be between 0 and 65535, got: {}",
            field, number
        ))
    })
}

/// Check if a string is a valid hostname
///
/// A single trailing dot (FQDN form) is allowed. Every label is 1 to 63
/// characters of alphanumerics and `-`, with alphanumerics at both ends.
pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.len() > MAX_NAME_LEN {
        return false;
    }

    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    if hostname.is_empty() {
        return false;
    }

    hostname.split('.').all(|label| {
        let bytes = label.as_bytes();
        !bytes.is_empty()
            && bytes.len() <= MAX_LABEL_LEN
            && bytes[0].is_ascii_alphanumeric()
            && bytes[bytes.len() - 1].is_ascii_alphanumeric()
            && bytes.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'-')
    })
}
