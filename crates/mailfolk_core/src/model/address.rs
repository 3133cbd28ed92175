//! Email address normalization and decoded header pairs.
//!
//! # Invariants
//! - Normalized addresses are trimmed and lowercased.
//! - An `AddressPair` never carries an empty address or an empty name.

use serde::Serialize;

/// Normalizes an address for storage, lookup and comparison.
///
/// Returns `None` when nothing is left after trimming.
pub fn normalize_address(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Returns the text before the first `@`, or the whole address without one.
pub fn local_part(address: &str) -> &str {
    address
        .split_once('@')
        .map(|(local, _)| local)
        .unwrap_or(address)
}

/// One decoded `(display name, address)` entry of an address header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressPair {
    /// Charset-decoded display name, `None` when the header gave none.
    pub name: Option<String>,
    /// Normalized address.
    pub address: String,
}

impl AddressPair {
    /// Builds a pair from raw parts.
    ///
    /// Returns `None` when `address` normalizes to nothing. Blank names are
    /// stored as `None`.
    pub fn new(name: Option<&str>, address: &str) -> Option<Self> {
        let address = normalize_address(address)?;
        let name = name
            .map(|value| value.trim().trim_matches('"').trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Some(Self { name, address })
    }

    /// Display name, falling back to the address local part.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| local_part(&self.address))
    }
}
