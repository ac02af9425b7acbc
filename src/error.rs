//! Error handling for MAGICC input file reading.
//!
//! Provides error types with context for format detection, namelist
//! parsing, table extraction and document access failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MagiccError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Cannot find {path}")]
    FileNotFound { path: PathBuf },

    #[error("Could not find namelist within {path}")]
    NamelistNotFound { path: PathBuf },

    #[error("Invalid input file format in {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Unexpected label line in {path}: expected '{expected}', found '{found}'")]
    LabelMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Table has {labels} column labels for {columns} data columns")]
    ColumnCountMismatch { labels: usize, columns: usize },

    #[error("Different units for {quantity} in {path}")]
    UnitConflict { quantity: String, path: PathBuf },

    #[error("Column ({quantity}, {region}) not found")]
    ColumnNotFound { quantity: String, region: String },

    #[error("Quantity {quantity} not found")]
    QuantityNotFound { quantity: String },

    #[error("File {name} has not been read from disk yet")]
    NotLoaded { name: String },

    #[error("Writing MAGICC input files is not supported")]
    WriteUnsupported,

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl MagiccError {
    /// Create an invalid format error for a file
    pub fn invalid_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error describes a structurally broken file
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::NamelistNotFound { .. }
                | Self::InvalidFormat { .. }
                | Self::LabelMismatch { .. }
                | Self::ColumnCountMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MagiccError>;
