//! Merge-aware identity store.
//!
//! # Responsibility
//! - Own every `Identity` record in an arena addressed by `IdentityId`.
//! - Map each normalized address to its canonical owner.
//! - Fold records together when an observation shows they share an address.
//!
//! # Invariants
//! - Every mapped address points to a live record that owns it.
//! - No two live records share an address.
//! - Relations are symmetric, never self-referencing, and only name live ids.
//! - A merged-away slot becomes a redirect to its survivor; ids are never
//!   reused, so stale handles still resolve to the canonical record.
//! - The earliest-created record survives a merge, which keeps its primary
//!   email (and therefore its filename) stable.

use crate::model::address::normalize_address;
use crate::model::identity::{Identity, IdentityId};
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for identity insertion and linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Incoming identity owns no address.
    EmptyIdentity,
    /// Id does not belong to this store.
    UnknownIdentity(IdentityId),
    /// Internal invariant violation found by `validate`.
    Inconsistent(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIdentity => write!(f, "identity must own at least one address"),
            Self::UnknownIdentity(id) => write!(f, "identity not found: {id}"),
            Self::Inconsistent(details) => write!(f, "inconsistent identity store: {details}"),
        }
    }
}

impl Error for StoreError {}

/// Result of drawing a knows-edge between two identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Added,
    AlreadyLinked,
    /// Both ends resolved to the same canonical identity.
    SelfEdge,
}

#[derive(Debug, Clone)]
enum Slot {
    Live(Identity),
    Merged(IdentityId),
}

/// Arena of identities keyed by normalized address.
#[derive(Debug, Default)]
pub struct IdentityStore {
    slots: Vec<Slot>,
    by_address: HashMap<String, IdentityId>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical owner of `address`, normalizing it first.
    pub fn lookup(&self, address: &str) -> Option<IdentityId> {
        let normalized = normalize_address(address)?;
        let id = self.by_address.get(&normalized).copied()?;
        self.resolve(id)
    }

    /// Follows merge redirects to the canonical id.
    ///
    /// Returns `None` for ids that never belonged to this store.
    pub fn resolve(&self, id: IdentityId) -> Option<IdentityId> {
        let mut current = id;
        loop {
            match self.slots.get(current.0)? {
                Slot::Live(_) => return Some(current),
                Slot::Merged(next) => current = *next,
            }
        }
    }

    /// Returns the canonical record for `id`, following redirects.
    pub fn get(&self, id: IdentityId) -> Option<&Identity> {
        let canonical = self.resolve(id)?;
        self.live(canonical).ok()
    }

    /// Returns whether two handles name the same canonical identity.
    pub fn same_identity(&self, left: IdentityId, right: IdentityId) -> bool {
        match (self.resolve(left), self.resolve(right)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }

    /// Inserts `identity`, folding it with every record sharing an address.
    ///
    /// # Contract
    /// - All existing canonical owners of the incoming addresses, and the
    ///   incoming record itself, collapse into one survivor.
    /// - Every address of the survivor is repointed to it.
    /// - Relations carried by the incoming record are redrawn symmetrically.
    ///
    /// # Errors
    /// - `StoreError::EmptyIdentity` when the record owns no address.
    /// - `StoreError::UnknownIdentity` when a carried relation is foreign to
    ///   this store. The store is left untouched in both cases.
    pub fn upsert(&mut self, mut identity: Identity) -> StoreResult<IdentityId> {
        if identity.emails().is_empty() {
            return Err(StoreError::EmptyIdentity);
        }
        let carried = identity
            .take_relations()
            .into_iter()
            .map(|id| self.resolve(id).ok_or(StoreError::UnknownIdentity(id)))
            .collect::<StoreResult<BTreeSet<_>>>()?;

        let mut owners = identity
            .emails()
            .iter()
            .filter_map(|address| self.by_address.get(address).copied())
            .filter_map(|id| self.resolve(id))
            .collect::<BTreeSet<_>>();

        let survivor = match owners.pop_first() {
            None => {
                let id = IdentityId(self.slots.len());
                debug!(
                    "event=identity_create module=store status=ok id={} primary={}",
                    id,
                    identity.primary_email()
                );
                self.slots.push(Slot::Live(identity));
                id
            }
            Some(survivor) => {
                self.live_mut(survivor)?.absorb(identity);
                for absorbed in owners {
                    self.fold(survivor, absorbed)?;
                }
                survivor
            }
        };

        for related in carried {
            if let Some(related) = self.resolve(related) {
                self.link(survivor, related)?;
            }
        }
        self.repoint(survivor)?;
        Ok(survivor)
    }

    /// Draws a symmetric knows-edge between the canonical records of `left`
    /// and `right`.
    pub fn link(&mut self, left: IdentityId, right: IdentityId) -> StoreResult<LinkOutcome> {
        let left = self
            .resolve(left)
            .ok_or(StoreError::UnknownIdentity(left))?;
        let right = self
            .resolve(right)
            .ok_or(StoreError::UnknownIdentity(right))?;
        if left == right {
            return Ok(LinkOutcome::SelfEdge);
        }
        let added = self.live_mut(left)?.add_relation(right);
        self.live_mut(right)?.add_relation(left);
        Ok(if added {
            LinkOutcome::Added
        } else {
            LinkOutcome::AlreadyLinked
        })
    }

    /// Live records in creation order.
    pub fn identities(&self) -> impl Iterator<Item = (IdentityId, &Identity)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Live(identity) => Some((IdentityId(index), identity)),
                Slot::Merged(_) => None,
            })
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.identities().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct addresses known to the store.
    pub fn address_count(&self) -> usize {
        self.by_address.len()
    }

    /// Checks every store invariant.
    ///
    /// Intended for tests and debug diagnostics; normal operation keeps the
    /// invariants by construction.
    pub fn validate(&self) -> StoreResult<()> {
        for (address, id) in &self.by_address {
            let identity = self.live(*id).map_err(|_| {
                StoreError::Inconsistent(format!("address `{address}` points to dead id {id}"))
            })?;
            if !identity.emails().contains(address) {
                return Err(StoreError::Inconsistent(format!(
                    "address `{address}` points to {id} which does not own it"
                )));
            }
        }
        for (id, identity) in self.identities() {
            for address in identity.emails() {
                if self.by_address.get(address) != Some(&id) {
                    return Err(StoreError::Inconsistent(format!(
                        "address `{address}` of {id} is not mapped to it"
                    )));
                }
            }
            for related in identity.relations() {
                if *related == id {
                    return Err(StoreError::Inconsistent(format!("{id} relates to itself")));
                }
                let other = self.live(*related).map_err(|_| {
                    StoreError::Inconsistent(format!("{id} relates to dead id {related}"))
                })?;
                if !other.relations().contains(&id) {
                    return Err(StoreError::Inconsistent(format!(
                        "relation {id} -> {related} is not symmetric"
                    )));
                }
            }
        }
        Ok(())
    }

    fn live(&self, id: IdentityId) -> StoreResult<&Identity> {
        match self.slots.get(id.0) {
            Some(Slot::Live(identity)) => Ok(identity),
            _ => Err(StoreError::UnknownIdentity(id)),
        }
    }

    fn live_mut(&mut self, id: IdentityId) -> StoreResult<&mut Identity> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Live(identity)) => Ok(identity),
            _ => Err(StoreError::UnknownIdentity(id)),
        }
    }

    /// Moves the live record `absorbed` into `survivor` and rewrites every
    /// edge that pointed at it.
    fn fold(&mut self, survivor: IdentityId, absorbed: IdentityId) -> StoreResult<()> {
        if survivor == absorbed {
            return Ok(());
        }
        self.live(survivor)?;
        self.live(absorbed)?;
        let Slot::Live(mut record) =
            std::mem::replace(&mut self.slots[absorbed.0], Slot::Merged(survivor))
        else {
            return Err(StoreError::UnknownIdentity(absorbed));
        };

        let relations = record.take_relations();
        debug!(
            "event=identity_merge module=store status=ok survivor={} absorbed={} absorbed_primary={} relations={}",
            survivor,
            absorbed,
            record.primary_email(),
            relations.len()
        );
        self.live_mut(survivor)?.absorb(record);
        self.live_mut(survivor)?.remove_relation(absorbed);

        for related in relations {
            if related == survivor {
                continue;
            }
            self.live_mut(related)?.remove_relation(absorbed);
            self.link(survivor, related)?;
        }
        Ok(())
    }

    fn repoint(&mut self, survivor: IdentityId) -> StoreResult<()> {
        let addresses = self.live(survivor)?.emails().clone();
        for address in addresses {
            self.by_address.insert(address, survivor);
        }
        Ok(())
    }
}
