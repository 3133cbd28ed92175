//! Identity domain model.
//!
//! # Responsibility
//! - Define the mergeable record representing one real-world person.
//! - Provide the merge algebra used by the identity store.
//!
//! # Invariants
//! - `emails` is never empty and only holds normalized addresses.
//! - `primary_email` is a member of `emails` and never changes after creation.
//! - `relations` are keyed by `IdentityId`, never by address.
//!
//! # See also
//! - `store::identity_store` for redirect-aware merging of live records.

use crate::model::address::{local_part, normalize_address, AddressPair};
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Arena index of an identity inside an `IdentityStore`.
///
/// Ids are never reused. A merged-away id stays valid as a redirect to the
/// surviving record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct IdentityId(pub(crate) usize);

impl IdentityId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for IdentityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Origin of an identity's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// Display name decoded from a message header.
    Header,
    /// Placeholder derived from the address local part.
    LocalPart,
}

/// Construction error for identity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Address was blank after normalization.
    EmptyAddress,
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAddress => write!(f, "identity address cannot be empty"),
        }
    }
}

impl Error for IdentityError {}

/// One real-world person known under one or more addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    name: String,
    name_source: NameSource,
    primary_email: String,
    emails: BTreeSet<String>,
    relations: BTreeSet<IdentityId>,
}

impl Identity {
    /// Creates a one-address identity.
    ///
    /// # Contract
    /// - `address` is normalized before storage.
    /// - A blank or absent `name` falls back to the address local part.
    ///
    /// # Errors
    /// - `IdentityError::EmptyAddress` when `address` normalizes to nothing.
    pub fn new(name: Option<&str>, address: &str) -> Result<Self, IdentityError> {
        let pair = AddressPair::new(name, address).ok_or(IdentityError::EmptyAddress)?;
        Ok(Self::from_pair(&pair))
    }

    /// Creates a one-address identity from an already decoded header pair.
    pub fn from_pair(pair: &AddressPair) -> Self {
        let (name, name_source) = match pair.name.as_deref() {
            Some(name) => (name.to_string(), NameSource::Header),
            None => (
                local_part(&pair.address).to_string(),
                NameSource::LocalPart,
            ),
        };
        Self {
            name,
            name_source,
            primary_email: pair.address.clone(),
            emails: BTreeSet::from([pair.address.clone()]),
            relations: BTreeSet::new(),
        }
    }

    /// Adds another address of the same person.
    ///
    /// Returns whether the address was new to this identity.
    pub fn add_email(&mut self, address: &str) -> Result<bool, IdentityError> {
        let normalized = normalize_address(address).ok_or(IdentityError::EmptyAddress)?;
        Ok(self.emails.insert(normalized))
    }

    /// Adds the address of an already decoded pair; the pair's name is ignored.
    pub fn add_pair_address(&mut self, pair: &AddressPair) -> bool {
        self.emails.insert(pair.address.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_source(&self) -> NameSource {
        self.name_source
    }

    /// First address this identity ever owned.
    pub fn primary_email(&self) -> &str {
        &self.primary_email
    }

    /// All owned addresses in lexical order.
    pub fn emails(&self) -> &BTreeSet<String> {
        &self.emails
    }

    pub fn relations(&self) -> &BTreeSet<IdentityId> {
        &self.relations
    }

    /// Returns whether `address` (normalized first) belongs to this identity.
    pub fn owns(&self, address: &str) -> bool {
        normalize_address(address).is_some_and(|normalized| self.emails.contains(&normalized))
    }

    /// Output document filename, fixed by the primary email.
    pub fn filename(&self) -> String {
        format!("{}.html", self.primary_email)
    }

    /// Merges `other` into `self` and returns the result.
    ///
    /// # Contract
    /// - Email and relation sets are unioned, so merging is commutative and
    ///   associative over those sets, and idempotent.
    /// - `self` keeps its primary email.
    /// - `self` keeps its name unless it is a local-part placeholder and
    ///   `other` carries a header name.
    pub fn merge(mut self, other: Identity) -> Identity {
        self.absorb(other);
        self
    }

    pub(crate) fn absorb(&mut self, other: Identity) {
        if self.name_source == NameSource::LocalPart && other.name_source == NameSource::Header {
            self.name = other.name;
            self.name_source = NameSource::Header;
        }
        self.emails.extend(other.emails);
        self.relations.extend(other.relations);
    }

    pub(crate) fn add_relation(&mut self, other: IdentityId) -> bool {
        self.relations.insert(other)
    }

    pub(crate) fn remove_relation(&mut self, other: IdentityId) -> bool {
        self.relations.remove(&other)
    }

    pub(crate) fn take_relations(&mut self) -> BTreeSet<IdentityId> {
        std::mem::take(&mut self.relations)
    }
}
