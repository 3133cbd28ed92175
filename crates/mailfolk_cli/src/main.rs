//! `mailfolk` command-line entry point.
//!
//! # Responsibility
//! - Parse corpus/output directories and logging options.
//! - Run one extraction and print its summary.
//!
//! # Invariants
//! - Invalid directories exit non-zero before any corpus processing.
//! - Per-message and per-document failures are reported, not fatal.

use clap::Parser;
use mailfolk_core::{default_log_level, init_logging, init_stderr_logging, run, RunConfig};
use mailfolk_core::{RunError, RunReport};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "mailfolk", version, about = "Mail to schema.org Person documents")]
struct Args {
    /// Directory containing mail files (one message per file).
    #[arg(short = 'd', value_name = "DIR")]
    input_dir: PathBuf,
    /// Output directory for the Person documents.
    #[arg(short = 'o', value_name = "DIR")]
    output_dir: PathBuf,
    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,
    /// Absolute directory for rotating log files; logs go to stderr otherwise.
    #[arg(long, value_name = "ABS_DIR")]
    log_dir: Option<String>,
    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    let logging = match args.log_dir.as_deref() {
        Some(dir) => init_logging(level, dir),
        None => init_stderr_logging(level),
    };
    if let Err(err) = logging {
        eprintln!("mailfolk: {err}");
        return ExitCode::from(2);
    }

    let config = RunConfig::new(args.input_dir, args.output_dir);
    match run(&config) {
        Ok(report) => {
            print_report(&report, args.json);
            ExitCode::SUCCESS
        }
        Err(err @ RunError::Config(_)) => {
            eprintln!("mailfolk: {err}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("mailfolk: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &RunReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("mailfolk: failed to encode report: {err}"),
        }
        return;
    }

    println!(
        "messages: {} ingested, {} skipped, {} unreadable",
        report.scan.messages_ingested, report.scan.messages_skipped, report.scan.files_unreadable
    );
    println!(
        "identities: {} ({} documents written)",
        report.identities, report.documents.written
    );
    for failure in &report.documents.failures {
        eprintln!("mailfolk: could not write {}: {}", failure.filename, failure.error);
    }
}
