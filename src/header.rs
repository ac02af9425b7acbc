//! MAGICC7 header annotation parsing.
//!
//! MAGICC7 files describe their contents in a prose header above the
//! namelist using tagged lines such as `Date: 2017-10-12`. This module
//! pulls those tags out of the raw header text. MAGICC6 headers carry no
//! tags and are never passed through here.

use crate::models::HeaderTag;
use std::collections::BTreeMap;
use tracing::debug;

/// Extract tagged fields from raw header text.
///
/// A line matches when, once trimmed, it starts with a tag label such as
/// `Compiled by:`. The value is the rest of the line, trimmed. A tag seen
/// on several lines keeps its last value.
pub fn parse_header_annotations(header: &str) -> BTreeMap<HeaderTag, String> {
    let mut annotations = BTreeMap::new();

    for line in header.lines() {
        let line = line.trim();
        for tag in HeaderTag::ALL {
            if let Some(value) = line.strip_prefix(tag.label()) {
                annotations.insert(*tag, value.trim().to_string());
            }
        }
    }

    debug!("Found {} header annotations", annotations.len());
    annotations
}
