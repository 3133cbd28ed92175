//! Corpus directory scan.
//!
//! # Responsibility
//! - Enumerate message files of one directory and ingest them in turn.
//! - Keep scanning past unreadable files and unparsable messages.
//!
//! # Invariants
//! - Only regular files are read; subdirectories and other entries are
//!   ignored.
//! - Entries are processed in file-name order for reproducible logs; the
//!   resulting identity partition does not depend on that order.

use crate::service::ingest::ingest_message;
use crate::service::linker::LinkReport;
use crate::store::identity_store::IdentityStore;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Counters for one corpus scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Messages folded into the store.
    pub messages_ingested: usize,
    /// Messages read but rejected (bad headers, missing `From`).
    pub messages_skipped: usize,
    /// Files that could not be read.
    pub files_unreadable: usize,
    /// Directory entries that are not regular files.
    pub entries_ignored: usize,
    /// Messages without any recipient header, recorded without edges.
    pub messages_without_recipient: usize,
    pub links: LinkReport,
}

/// Scans `dir` and folds every message into `store`.
///
/// # Errors
/// - Returns an I/O error only when `dir` itself cannot be listed.
pub fn scan_corpus(dir: &Path, store: &mut IdentityStore) -> io::Result<ScanReport> {
    let started_at = Instant::now();
    info!(
        "event=corpus_scan module=service status=start dir={}",
        dir.display()
    );

    let mut report = ScanReport::default();
    for path in sorted_entries(dir)? {
        if !path.is_file() {
            report.entries_ignored += 1;
            continue;
        }

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=message_read module=service status=skip path={} error={}",
                    path.display(),
                    err
                );
                report.files_unreadable += 1;
                continue;
            }
        };

        match ingest_message(store, &raw) {
            Ok(outcome) => {
                report.messages_ingested += 1;
                report.links.absorb(outcome.links);
                if outcome.myself.is_none() {
                    report.messages_without_recipient += 1;
                    warn!(
                        "event=message_ingest module=service status=ok path={} note=no_recipient_header",
                        path.display()
                    );
                }
            }
            Err(err) => {
                warn!(
                    "event=message_ingest module=service status=skip path={} error={}",
                    path.display(),
                    err
                );
                report.messages_skipped += 1;
            }
        }
    }

    info!(
        "event=corpus_scan module=service status=ok duration_ms={} ingested={} skipped={} unreadable={} identities={}",
        started_at.elapsed().as_millis(),
        report.messages_ingested,
        report.messages_skipped,
        report.files_unreadable,
        store.len()
    );
    Ok(report)
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        match entry {
            Ok(entry) => entries.push(entry.path()),
            Err(err) => warn!(
                "event=corpus_list module=service status=skip dir={} error={}",
                dir.display(),
                err
            ),
        }
    }
    entries.sort();
    Ok(entries)
}
