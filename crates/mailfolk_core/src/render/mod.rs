//! Output document rendering.
//!
//! # Responsibility
//! - Turn canonical identities into schema.org microdata documents.

pub mod schema;
