//! Configuration discovery and loading
//!
//! Every file in `<working dir>/jems` is one independent record. Records are
//! kept in file-name order and never merged.

use super::{ConfigError, ConfigRecord};
use std::path::{Path, PathBuf};

/// Directory, relative to the working directory, that holds configuration records
pub const CONFIG_DIR: &str = "jems";

/// On-disk format of a record, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Yaml,
    Toml,
}

impl RecordFormat {
    /// `.toml` files are TOML; everything else is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Ordered collection of independently loaded configuration records
#[derive(Debug, Clone, Default)]
pub struct ConfigBundle {
    records: Vec<ConfigRecord>,
}

impl ConfigBundle {
    /// Build a bundle from records already in discovery order
    pub fn new(records: Vec<ConfigRecord>) -> Self {
        Self { records }
    }

    /// Load every record under `<working_dir>/jems`
    pub fn load(working_dir: &Path) -> Result<Self, ConfigError> {
        let dir = working_dir.join(CONFIG_DIR);

        let metadata = match std::fs::metadata(&dir) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound { path: dir });
            }
            Err(source) => return Err(ConfigError::Read { path: dir, source }),
        };

        if !metadata.is_dir() {
            return Err(ConfigError::NotADirectory { path: dir });
        }

        let mut records = Vec::new();
        for path in record_paths(&dir)? {
            if let Some(record) = load_record(&path)? {
                records.push(record);
            }
        }

        if records.is_empty() {
            return Err(ConfigError::Empty { path: dir });
        }

        tracing::debug!(
            dir = %dir.display(),
            records = records.len(),
            "Loaded configuration records"
        );

        Ok(Self::new(records))
    }

    /// Records in discovery order
    pub fn records(&self) -> &[ConfigRecord] {
        &self.records
    }
}

/// Candidate record files in `dir`, sorted by name
fn record_paths(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let read_error = |source| ConfigError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();

        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden || path.is_dir() {
            tracing::debug!(path = %path.display(), "Skipping non-record entry");
            continue;
        }

        paths.push(path);
    }

    paths.sort();
    Ok(paths)
}

/// Load a single record file. Blank files yield `None`.
pub fn load_record(path: &Path) -> Result<Option<ConfigRecord>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if contents.trim().is_empty() {
        tracing::warn!(path = %path.display(), "Skipping empty configuration file");
        return Ok(None);
    }

    let mut record =
        parse_record(&contents, RecordFormat::from_path(path)).map_err(|message| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            }
        })?;

    record.validate().map_err(|errors| ConfigError::Invalid {
        path: path.to_path_buf(),
        errors,
    })?;

    record.source = Some(path.to_path_buf());
    Ok(Some(record))
}

/// Parse record text in the given format
pub fn parse_record(contents: &str, format: RecordFormat) -> Result<ConfigRecord, String> {
    match format {
        RecordFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
        RecordFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
    }
}
