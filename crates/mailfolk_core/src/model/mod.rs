//! Domain model for people discovered in a mail corpus.
//!
//! # Responsibility
//! - Define canonical data structures used by identity resolution.
//! - Keep address normalization in one place.
//!
//! # Invariants
//! - Every address is normalized before comparison, storage or lookup.
//! - Every person is addressed by a stable `IdentityId` once stored.

pub mod address;
pub mod identity;
