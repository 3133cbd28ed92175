//! Identity resolution use-cases.
//!
//! # Responsibility
//! - Orchestrate header extraction and store mutations per message.
//! - Drive full corpus runs from configuration to written documents.

pub mod corpus;
pub mod ingest;
pub mod linker;
pub mod run;
pub mod self_alias;
