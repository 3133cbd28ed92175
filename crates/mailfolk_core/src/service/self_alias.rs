//! Recipient ("myself") resolution for one message.
//!
//! # Responsibility
//! - Union the delivery address and every self-alias header into one
//!   provisional identity.
//! - Commit it to the store and hand back the canonical id.
//!
//! # Invariants
//! - Must run before any edge of the same message is drawn, so edges never
//!   land on a provisional record that a later merge discards.
//! - Aliases are unioned directly; they are the same inbox, not a second
//!   person to merge with.

use crate::model::address::AddressPair;
use crate::model::identity::{Identity, IdentityId};
use crate::store::identity_store::{IdentityStore, StoreResult};
use log::debug;
use std::collections::BTreeSet;

/// Resolves the canonical recipient identity of one message.
///
/// `delivered_to` is the primary delivery address; when absent the first
/// alias takes its place. Returns `Ok(None)` when the message names no
/// recipient inbox at all.
pub fn resolve_myself(
    store: &mut IdentityStore,
    delivered_to: Option<&AddressPair>,
    aliases: &[AddressPair],
) -> StoreResult<Option<IdentityId>> {
    let mut candidates = delivered_to.into_iter().chain(aliases.iter());
    let Some(primary) = candidates.next() else {
        return Ok(None);
    };

    let mut provisional = Identity::from_pair(primary);
    for alias in candidates {
        provisional.add_pair_address(alias);
    }

    let known_owners = provisional
        .emails()
        .iter()
        .filter_map(|address| store.lookup(address))
        .collect::<BTreeSet<_>>();
    if !known_owners.is_empty() {
        debug!(
            "event=self_alias_resolve module=service status=ok primary={} addresses={} known_owners={}",
            provisional.primary_email(),
            provisional.emails().len(),
            known_owners.len()
        );
    }

    store.upsert(provisional).map(Some)
}
