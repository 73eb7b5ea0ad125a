//! Error taxonomy for the measurement pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input file is missing or unreadable. The orchestrator recovers from this one.
    #[error("input file not found at {path}: {source}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("cannot convert column '{column}' at row {row}, value '{value}': {reason}")]
    TypeConversion {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
