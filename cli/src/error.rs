//! Error types for the argspec front end.
//!
//! Covers argument-file reading, manifest loading and option registration.

use std::path::PathBuf;

use argspec_core::SpecError;
use thiserror::Error;

/// Errors raised outside the matching engine.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// An option specification in a manifest was rejected.
    #[error("invalid option spec: {0}")]
    Spec(#[from] SpecError),

    /// A line of an argument file holds an unterminated or malformed string.
    #[error("malformed string, line {line}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
    },

    /// Reading an argument file failed.
    #[error("file {}: {source}", .path.display())]
    ArgFile {
        /// The argument file.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: Box<CliError>,
    },

    /// A manifest entry is inconsistent.
    #[error("invalid manifest entry {index}: {reason}")]
    InvalidManifest {
        /// 0-based entry index.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
}

/// Convenience alias for results with [`CliError`].
pub type Result<T> = std::result::Result<T, CliError>;
