//! In-memory identity storage.
//!
//! # Responsibility
//! - Hold every identity discovered during one run.
//! - Enforce address uniqueness and relation symmetry across merges.
//!
//! # Invariants
//! - The store is rebuilt from scratch for every run; nothing is persisted.
//! - Callers hold `IdentityId` handles only; the store owns all records.

pub mod identity_store;
