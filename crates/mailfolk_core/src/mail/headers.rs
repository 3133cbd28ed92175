//! Address header extraction for raw RFC 5322 messages.
//!
//! # Responsibility
//! - Parse the header block of one raw message.
//! - Decode address fields into normalized `AddressPair` lists, expanding
//!   multi-address fields and groups.
//!
//! # Invariants
//! - Every returned address is normalized.
//! - Extraction never mutates identity state; callers get a complete
//!   `MessageHeaders` or an error before touching the store.
//! - Undecodable address fields fall back to a raw-text scan instead of
//!   failing the message.

use crate::model::address::AddressPair;
use log::debug;
use mailparse::{addrparse_header, parse_headers, MailAddr, MailHeader, MailHeaderMap};
use mailparse::{MailParseError, SingleInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const FIELD_FROM: &str = "From";
pub const FIELD_DELIVERED_TO: &str = "Delivered-To";
pub const FIELD_ORIGINAL_TO: &str = "X-Original-To";
pub const FIELD_RESENT_FROM: &str = "Resent-From";
pub const FIELD_TO: &str = "To";
pub const FIELD_CC: &str = "Cc";

/// Headers naming the recipient inbox under an alternate address.
pub const SELF_ALIAS_FIELDS: &[&str] = &[FIELD_ORIGINAL_TO, FIELD_RESENT_FROM];

static ANGLE_ADDR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*([^<>\s@]+@[^<>\s]+)\s*>").expect("valid angle address regex"));
static BARE_ADDR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\s<>,;:"()\[\]]+@[^\s<>,;:"()\[\]]+"#).expect("valid bare address regex")
});

/// Header extraction error for one message.
#[derive(Debug)]
pub enum HeaderError {
    /// Header block could not be parsed at all.
    Malformed(MailParseError),
    /// Required address field is absent or holds no usable address.
    MissingOrUnparsableAddress { field: &'static str },
}

impl Display for HeaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed header block: {err}"),
            Self::MissingOrUnparsableAddress { field } => {
                write!(f, "missing or unparsable `{field}` address")
            }
        }
    }
}

impl Error for HeaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::MissingOrUnparsableAddress { .. } => None,
        }
    }
}

impl From<MailParseError> for HeaderError {
    fn from(value: MailParseError) -> Self {
        Self::Malformed(value)
    }
}

/// Address data of one message needed for identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeaders {
    /// First address of the `From` field.
    pub from: AddressPair,
    /// First address of `Delivered-To`, when present.
    pub delivered_to: Option<AddressPair>,
    /// First address of each present self-alias header, in field order.
    pub self_aliases: Vec<AddressPair>,
    /// Every address of every `To` field.
    pub to: Vec<AddressPair>,
    /// Every address of every `Cc` field.
    pub cc: Vec<AddressPair>,
}

impl MessageHeaders {
    /// `To` then `Cc` addressees.
    pub fn recipients(&self) -> impl Iterator<Item = &AddressPair> + '_ {
        self.to.iter().chain(self.cc.iter())
    }
}

/// Extracts address headers from one raw message.
///
/// # Errors
/// - `HeaderError::Malformed` when the header block cannot be parsed.
/// - `HeaderError::MissingOrUnparsableAddress` when `From` yields no address.
pub fn extract_headers(raw: &[u8]) -> Result<MessageHeaders, HeaderError> {
    let (headers, _body_offset) = parse_headers(raw)?;

    let from = first_address(&headers, FIELD_FROM)
        .ok_or(HeaderError::MissingOrUnparsableAddress { field: FIELD_FROM })?;
    let delivered_to = first_address(&headers, FIELD_DELIVERED_TO);
    let self_aliases = SELF_ALIAS_FIELDS
        .iter()
        .filter_map(|field| first_address(&headers, field))
        .collect();

    Ok(MessageHeaders {
        from,
        delivered_to,
        self_aliases,
        to: address_list(&headers, FIELD_TO),
        cc: address_list(&headers, FIELD_CC),
    })
}

/// First address found in the first occurrence of `field`.
pub fn first_address(headers: &[MailHeader], field: &str) -> Option<AddressPair> {
    headers
        .get_first_header(field)
        .and_then(|header| parse_field(header).into_iter().next())
}

/// All addresses of every occurrence of `field`, groups expanded.
pub fn address_list(headers: &[MailHeader], field: &str) -> Vec<AddressPair> {
    headers
        .get_all_headers(field)
        .into_iter()
        .flat_map(parse_field)
        .collect()
}

fn parse_field(header: &MailHeader) -> Vec<AddressPair> {
    match addrparse_header(header) {
        Ok(list) => list
            .iter()
            .flat_map(|entry| match entry {
                MailAddr::Single(info) => vec![pair_from_info(info)],
                MailAddr::Group(group) => group.addrs.iter().map(pair_from_info).collect(),
            })
            .flatten()
            .collect(),
        Err(err) => {
            debug!(
                "event=header_decode_fallback module=mail status=skip field={} error={}",
                header.get_key(),
                err
            );
            scan_raw_addresses(&String::from_utf8_lossy(header.get_value_raw()))
        }
    }
}

fn pair_from_info(info: &SingleInfo) -> Option<AddressPair> {
    AddressPair::new(info.display_name.as_deref(), &info.addr)
}

/// Recovers addresses from undecodable header text.
///
/// Each comma-separated segment contributes at most one address: an
/// `<addr>` token (with the text before it as display name) or else the
/// first bare `local@domain` token.
pub fn scan_raw_addresses(raw: &str) -> Vec<AddressPair> {
    raw.split(',')
        .filter_map(|segment| {
            if let Some(captures) = ANGLE_ADDR_RE.captures(segment) {
                let whole = captures.get(0)?;
                let name = segment[..whole.start()].trim();
                let name = (!name.is_empty()).then_some(name);
                return AddressPair::new(name, captures.get(1)?.as_str());
            }
            BARE_ADDR_RE
                .find(segment)
                .and_then(|found| AddressPair::new(None, found.as_str()))
        })
        .collect()
}
