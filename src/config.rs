//! Pipeline configuration: input selection, filter values, worker tuning.
//!
//! Validation runs before any file is opened — a bad configuration fails
//! fast with no partial work. Defaults may come from an optional TOML file
//! merged under explicit CLI flags:
//!
//! ```toml
//! # pmxtract.toml
//! [extract]
//! pattern = "^A.*\\.xml$"
//! workers = 8
//! timeout_secs = 600
//! output = "csv"
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::filter::RecordFilter;
use crate::sink::OutputKind;

/// Default filename pattern for directory enumeration. PM files are named
/// `A<date>.<...>.xml` per the measurement file-naming convention.
pub const DEFAULT_FILE_PATTERN: &str = r"^A.*\.xml$";

/// Configuration errors, detected before any work is performed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Neither a file nor a directory was given.
    #[error("no input file or directory specified")]
    NoInput,

    /// The input path does not exist or has the wrong kind.
    #[error("input not found: {0}")]
    InputNotFound(String),

    /// The input directory could not be enumerated.
    #[error("failed to read input directory {dir}: {source}")]
    DirUnreadable {
        /// Directory path.
        dir: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Directory enumeration produced no matching file.
    #[error("no files matched pattern '{pattern}' in {dir}")]
    NoFilesMatched {
        /// Directory path.
        dir: String,
        /// Pattern applied to filenames.
        pattern: String,
    },

    /// The filename pattern is not a valid regular expression.
    #[error("invalid filename pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },

    /// A `measInfoId` filter was given but blank.
    #[error("measInfoId filter must not be empty")]
    EmptyMeasInfoId,

    /// An `objLdn` filter entry was blank.
    #[error("objLdn filter entries must not be empty")]
    EmptyObjLdn,

    /// Worker count of zero.
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    /// Timeout of zero.
    #[error("timeout must be at least 1 second")]
    ZeroTimeout,

    /// Batch queue depth of zero.
    #[error("batch queue depth must be at least 1")]
    ZeroQueueDepth,

    /// The defaults file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigFileUnreadable {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The defaults file is not valid TOML.
    #[error("invalid TOML configuration: {0}")]
    InvalidToml(#[from] toml::de::Error),
}

/// Input source: one file, or a directory enumerated by pattern.
#[derive(Debug, Clone)]
pub enum InputSelection {
    /// A single PM file.
    File(PathBuf),
    /// Every pattern-matching file directly inside a directory.
    Directory(PathBuf),
}

/// Everything the pipeline core consumes from the configuration surface.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Input source.
    pub input: InputSelection,
    /// Filename pattern applied to directory enumeration.
    pub pattern: String,
    /// Filter predicates.
    pub filter: RecordFilter,
    /// Worker-pool size; `None` = platform parallelism.
    pub workers: Option<usize>,
    /// Overall run deadline in seconds; `None` = unbounded.
    pub timeout_secs: Option<u64>,
    /// Abandon the run after this many per-file failures.
    pub fail_fast_after: Option<usize>,
}

impl PipelineConfig {
    /// Check the configuration, failing fast before any file is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref id) = self.filter.meas_info_id {
            if id.trim().is_empty() {
                return Err(ConfigError::EmptyMeasInfoId);
            }
        }
        if self.filter.obj_ldns.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::EmptyObjLdn);
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Regex::new(&self.pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.pattern.clone(),
            source,
        })?;
        Ok(())
    }

    /// Enumerate the input files this run will process, sorted by path.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        match &self.input {
            InputSelection::File(path) => {
                if !path.is_file() {
                    return Err(ConfigError::InputNotFound(path.display().to_string()));
                }
                Ok(vec![path.clone()])
            }
            InputSelection::Directory(dir) => {
                let pattern =
                    Regex::new(&self.pattern).map_err(|source| ConfigError::InvalidPattern {
                        pattern: self.pattern.clone(),
                        source,
                    })?;
                if !dir.is_dir() {
                    return Err(ConfigError::InputNotFound(dir.display().to_string()));
                }
                let entries =
                    std::fs::read_dir(dir).map_err(|source| ConfigError::DirUnreadable {
                        dir: dir.display().to_string(),
                        source,
                    })?;

                let mut files: Vec<PathBuf> = Vec::new();
                for entry in entries {
                    let entry = entry.map_err(|source| ConfigError::DirUnreadable {
                        dir: dir.display().to_string(),
                        source,
                    })?;
                    let path = entry.path();
                    let name = entry.file_name();
                    if path.is_file() && pattern.is_match(&name.to_string_lossy()) {
                        files.push(path);
                    }
                }
                files.sort();

                if files.is_empty() {
                    return Err(ConfigError::NoFilesMatched {
                        dir: dir.display().to_string(),
                        pattern: self.pattern.clone(),
                    });
                }
                Ok(files)
            }
        }
    }
}

/// Root structure for optional `pmxtract.toml` defaults.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// Extraction defaults merged under explicit CLI flags.
    #[serde(default)]
    pub extract: ExtractDefaults,
}

/// Defaults for the extract command.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractDefaults {
    /// Filename pattern for directory input.
    pub pattern: Option<String>,

    /// Worker-pool size.
    pub workers: Option<usize>,

    /// Overall run deadline in seconds.
    pub timeout_secs: Option<u64>,

    /// Per-file failure threshold before the run is abandoned.
    pub fail_fast_after: Option<usize>,

    /// Default output kind.
    pub output: Option<OutputKind>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileUnreadable {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
