//! Core data structures for MAGICC input files.
//!
//! Defines format versions, namelist values, the metadata assembled
//! from a file and the labels attached to table columns.

use crate::constants::{COLUMN_LABEL_SEPARATOR, MAGICC7_BANNER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Input file layouts supported by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatVersion {
    Magicc6,
    Magicc7,
}

impl FormatVersion {
    /// Detect the format from the first line of a file.
    ///
    /// Only MAGICC7 files carry the banner; anything else is MAGICC6.
    pub fn detect(first_line: &str) -> Self {
        if first_line.contains(MAGICC7_BANNER) {
            FormatVersion::Magicc7
        } else {
            FormatVersion::Magicc6
        }
    }

    /// Human-readable format name
    pub fn friendly_name(&self) -> &'static str {
        match self {
            FormatVersion::Magicc6 => "MAGICC6",
            FormatVersion::Magicc7 => "MAGICC7",
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.friendly_name())
    }
}

/// A value read from the embedded namelist or the file header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Real(f64),
    Logical(bool),
    Text(String),
    List(Vec<MetadataValue>),
    /// Empty namelist value such as the `2*` in `1, 2*, 4`
    Null,
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Integer(value) => Some(*value as f64),
            MetadataValue::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Logical(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }

    pub fn as_list(&self) -> Option<&[MetadataValue]> {
        match self {
            MetadataValue::List(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Integer(value) => write!(f, "{}", value),
            MetadataValue::Real(value) => write!(f, "{}", value),
            MetadataValue::Logical(value) => write!(f, "{}", value),
            MetadataValue::Text(value) => f.write_str(value),
            MetadataValue::Null => f.write_str("null"),
            MetadataValue::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

/// Tagged prose fields recognised in MAGICC7 headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeaderTag {
    Data,
    Date,
    Description,
    Source,
    Contact,
    CompiledBy,
}

impl HeaderTag {
    pub const ALL: &'static [HeaderTag] = &[
        HeaderTag::Data,
        HeaderTag::Date,
        HeaderTag::Description,
        HeaderTag::Source,
        HeaderTag::Contact,
        HeaderTag::CompiledBy,
    ];

    /// Metadata key the tag is stored under
    pub fn key(&self) -> &'static str {
        match self {
            HeaderTag::Data => "data",
            HeaderTag::Date => "date",
            HeaderTag::Description => "description",
            HeaderTag::Source => "source",
            HeaderTag::Contact => "contact",
            HeaderTag::CompiledBy => "compiled by",
        }
    }

    /// Label as written at the start of a header line, colon included
    pub fn label(&self) -> &'static str {
        match self {
            HeaderTag::Data => "Data:",
            HeaderTag::Date => "Date:",
            HeaderTag::Description => "Description:",
            HeaderTag::Source => "Source:",
            HeaderTag::Contact => "Contact:",
            HeaderTag::CompiledBy => "Compiled by:",
        }
    }
}

/// Metadata assembled from the namelist, the header and the table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Raw text preceding the namelist, verbatim
    pub header: String,
    /// Namelist entries with their namespace prefix removed, overlaid with
    /// header annotations
    pub entries: BTreeMap<String, MetadataValue>,
    /// Unit of each quantity in the table
    pub units: BTreeMap<String, String>,
}

impl Metadata {
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Text of a header annotation, if the file carried it
    pub fn annotation(&self, tag: HeaderTag) -> Option<&str> {
        self.entries.get(tag.key()).and_then(MetadataValue::as_str)
    }

    pub fn unit(&self, quantity: &str) -> Option<&str> {
        self.units.get(quantity).map(String::as_str)
    }
}

/// Two-part label of a data column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnLabel {
    /// Gas or emission type, e.g. `CO2I`
    pub quantity: String,
    /// Region or location, e.g. `GLOBAL`
    pub region: String,
}

impl ColumnLabel {
    pub fn new(quantity: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            quantity: quantity.into(),
            region: region.into(),
        }
    }

    pub fn matches(&self, quantity: &str, region: &str) -> bool {
        self.quantity == quantity && self.region == region
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.quantity, COLUMN_LABEL_SEPARATOR, self.region
        )
    }
}
