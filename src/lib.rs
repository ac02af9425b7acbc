//! MAGICC Input Library
//!
//! A Rust library for reading the emissions and forcing input files used by
//! the MAGICC reduced-complexity climate model.
//!
//! This library provides tools for:
//! - Detecting whether a file uses the MAGICC6 or MAGICC7 layout
//! - Parsing the Fortran namelist embedded in every input file
//! - Extracting MAGICC7 header annotations (date, source, contact, ...)
//! - Decoding the data section into a year-indexed polars table with
//!   (quantity, region) column labels and per-quantity units
//! - Lazily loading files from a MAGICC run directory

pub mod cli;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod header;
pub mod models;
pub mod namelist;
pub mod reader;
pub mod table;

// Re-export commonly used types
pub use config::{ReaderConfig, RunDirectory};
pub use document::InputDocument;
pub use error::{MagiccError, Result};
pub use models::{ColumnLabel, FormatVersion, HeaderTag, Metadata, MetadataValue};
pub use reader::{ParsedInput, read_input_file};
pub use table::LabeledTable;
