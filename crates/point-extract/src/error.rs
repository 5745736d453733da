//! Error types for point extraction.

use std::path::PathBuf;

use forecast_common::ForecastError;
use thiserror::Error;

/// Failure to decode one grid file. Never fatal to a whole query.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The decoder process could not be started.
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The decoder exited unsuccessfully.
    #[error("decoder exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    /// Fewer output records than requested fields.
    #[error("insufficient decoder output: expected {expected} records, found {found}")]
    InsufficientOutput { expected: usize, found: usize },

    /// A record without the `name:level:...:val=` shape.
    #[error("malformed decoder record: {0}")]
    MalformedRecord(String),

    /// A field value that is not a finite number.
    #[error("invalid value for {field}: {raw:?}")]
    InvalidValue { field: &'static str, raw: String },

    /// A requested field absent from the output.
    #[error("missing field in decoder output: {0}")]
    MissingField(&'static str),
}

/// Failure of a whole forecast query.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The published directory exists but cannot be listed.
    #[error("cannot read published directory {path}: {reason}")]
    Discovery { path: PathBuf, reason: String },

    /// Grid files were found but the decoder could not be started for any.
    #[error("decoder unavailable for all {files} grid files: {reason}")]
    DecoderUnavailable { files: usize, reason: String },

    /// Invalid discovery pattern.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

impl From<EngineError> for ForecastError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::DecoderUnavailable { .. } => ForecastError::InternalError(err.to_string()),
            _ => ForecastError::DataReadError(err.to_string()),
        }
    }
}
