//! Core identity resolution for mailfolk.
//! This crate is the single source of truth for identity and relation
//! invariants.

pub mod config;
pub mod logging;
pub mod mail;
pub mod model;
pub mod render;
pub mod service;
pub mod store;

pub use config::{ConfigError, RunConfig};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogSink};
pub use mail::headers::{extract_headers, HeaderError, MessageHeaders};
pub use model::address::{normalize_address, AddressPair};
pub use model::identity::{Identity, IdentityError, IdentityId, NameSource};
pub use render::schema::{render_person, write_documents, RenderError, WriteFailure, WriteReport};
pub use service::corpus::{scan_corpus, ScanReport};
pub use service::ingest::{ingest_headers, ingest_message, IngestError, MessageOutcome};
pub use service::linker::{link_contacts, LinkReport};
pub use service::run::{run, RunError, RunReport};
pub use service::self_alias::resolve_myself;
pub use store::identity_store::{IdentityStore, LinkOutcome, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
