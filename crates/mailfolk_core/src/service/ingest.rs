//! Per-message identity ingestion.
//!
//! # Responsibility
//! - Fold one message's address headers into the identity store.
//!
//! # Invariants
//! - Headers are fully extracted before the store is touched, so a message
//!   that fails extraction leaves no partial state.
//! - Order inside a message: resolve "myself", record the sender, then link
//!   sender and recipients to "myself".

use crate::mail::headers::{extract_headers, HeaderError, MessageHeaders};
use crate::model::identity::{Identity, IdentityId};
use crate::service::linker::{link_contacts, LinkReport};
use crate::service::self_alias::resolve_myself;
use crate::store::identity_store::{IdentityStore, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter;

/// Error raised while folding one message into the store.
#[derive(Debug)]
pub enum IngestError {
    Header(HeaderError),
    Store(StoreError),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Header(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<HeaderError> for IngestError {
    fn from(value: HeaderError) -> Self {
        Self::Header(value)
    }
}

impl From<StoreError> for IngestError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// What one message contributed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageOutcome {
    /// Canonical sender id at the end of the message.
    pub sender: IdentityId,
    /// Canonical recipient id, `None` when the message names no inbox.
    pub myself: Option<IdentityId>,
    pub links: LinkReport,
}

/// Parses and ingests one raw message.
pub fn ingest_message(
    store: &mut IdentityStore,
    raw: &[u8],
) -> Result<MessageOutcome, IngestError> {
    let headers = extract_headers(raw)?;
    ingest_headers(store, &headers)
}

/// Ingests already extracted message headers.
pub fn ingest_headers(
    store: &mut IdentityStore,
    headers: &MessageHeaders,
) -> Result<MessageOutcome, IngestError> {
    let myself = resolve_myself(store, headers.delivered_to.as_ref(), &headers.self_aliases)?;
    let sender = store.upsert(Identity::from_pair(&headers.from))?;

    let links = match myself {
        Some(myself) => {
            link_contacts(store, myself, iter::once(&headers.from).chain(headers.recipients()))?
        }
        None => LinkReport::default(),
    };

    Ok(MessageOutcome {
        sender: store.resolve(sender).unwrap_or(sender),
        myself: myself.map(|id| store.resolve(id).unwrap_or(id)),
        links,
    })
}
