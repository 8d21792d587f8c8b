//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Failures while discovering, reading, or parsing configuration records.
///
/// Every variant is fatal: no flow runs against a partially loaded bundle.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{} exists but is not a directory, nothing worth loading", path.display())]
    NotADirectory { path: PathBuf },

    #[error("no configuration records found in {}", path.display())]
    Empty { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration in {}:\n  {}", path.display(), errors.join("\n  "))]
    Invalid { path: PathBuf, errors: Vec<String> },
}
