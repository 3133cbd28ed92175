//! Run configuration.
//!
//! # Responsibility
//! - Carry the input corpus and output directories of one run.
//! - Validate them before any corpus processing starts.
//!
//! # Invariants
//! - Both directories must already exist; nothing is created on demand.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Startup configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Path given for `flag` is not an existing directory.
    InvalidDirectory { flag: &'static str, path: PathBuf },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory { flag, path } => {
                write!(f, "{} is not a directory (option {flag})", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Directories of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// Directory holding one raw message per file.
    pub input_dir: PathBuf,
    /// Directory receiving one document per identity.
    pub output_dir: PathBuf,
}

impl RunConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Checks that both directories exist.
    ///
    /// The input directory is checked first, so its error wins when both are
    /// invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InvalidDirectory {
                flag: "-d",
                path: self.input_dir.clone(),
            });
        }
        if !self.output_dir.is_dir() {
            return Err(ConfigError::InvalidDirectory {
                flag: "-o",
                path: self.output_dir.clone(),
            });
        }
        Ok(())
    }
}
