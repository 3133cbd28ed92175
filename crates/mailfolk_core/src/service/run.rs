//! End-to-end extraction run.
//!
//! # Responsibility
//! - Validate configuration, scan the corpus into a fresh store, then write
//!   one document per surviving identity.
//!
//! # Invariants
//! - Nothing is scanned or written when configuration is invalid.
//! - Documents are written only after the whole corpus has been scanned.

use crate::config::{ConfigError, RunConfig};
use crate::render::schema::{write_documents, WriteReport};
use crate::service::corpus::{scan_corpus, ScanReport};
use crate::store::identity_store::IdentityStore;
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

/// Fatal run error.
#[derive(Debug)]
pub enum RunError {
    Config(ConfigError),
    /// The corpus directory could not be listed.
    Scan(io::Error),
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Scan(err) => write!(f, "failed to list corpus directory: {err}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Scan(err) => Some(err),
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub scan: ScanReport,
    /// Live identities after the scan.
    pub identities: usize,
    pub documents: WriteReport,
}

/// Runs one full extraction.
pub fn run(config: &RunConfig) -> Result<RunReport, RunError> {
    if let Err(err) = config.validate() {
        error!("event=run module=service status=error error={}", err);
        return Err(err.into());
    }

    let mut store = IdentityStore::new();
    let scan = scan_corpus(&config.input_dir, &mut store).map_err(RunError::Scan)?;
    let documents = write_documents(&store, &config.output_dir);

    info!(
        "event=run module=service status=ok identities={} addresses={} written={}",
        store.len(),
        store.address_count(),
        documents.written
    );
    Ok(RunReport {
        scan,
        identities: store.len(),
        documents,
    })
}
