//! Knows-edge construction between "myself" and message correspondents.
//!
//! # Invariants
//! - Every contact is resolved or created through `IdentityStore::upsert`.
//! - Edges are keyed by canonical identity, so several addresses of one
//!   person yield one edge.
//! - A contact resolving to "myself" never produces an edge.

use crate::model::address::AddressPair;
use crate::model::identity::{Identity, IdentityId};
use crate::store::identity_store::{IdentityStore, LinkOutcome, StoreResult};
use serde::Serialize;

/// Edge counts produced by one linking pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub added: usize,
    pub already_linked: usize,
    pub skipped_self: usize,
}

impl LinkReport {
    pub fn absorb(&mut self, other: LinkReport) {
        self.added += other.added;
        self.already_linked += other.already_linked;
        self.skipped_self += other.skipped_self;
    }
}

/// Links every contact to `myself` with a symmetric knows-edge.
///
/// `myself` should be the canonical id returned by the self-alias resolver
/// for the same message.
pub fn link_contacts<'a, I>(
    store: &mut IdentityStore,
    myself: IdentityId,
    contacts: I,
) -> StoreResult<LinkReport>
where
    I: IntoIterator<Item = &'a AddressPair>,
{
    let mut report = LinkReport::default();
    for pair in contacts {
        let contact = store.upsert(Identity::from_pair(pair))?;
        match store.link(myself, contact)? {
            LinkOutcome::Added => report.added += 1,
            LinkOutcome::AlreadyLinked => report.already_linked += 1,
            LinkOutcome::SelfEdge => report.skipped_self += 1,
        }
    }
    Ok(report)
}
