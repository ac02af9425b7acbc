//! MAGICC7 data section decoding.
//!
//! MAGICC7 files describe their columns with four label lines after the
//! namelist:
//!
//! ```text
//! GAS     CO2     CH4
//! TODO    SET     SET
//! UNITS   GtC     Mt
//! YEARS   GLOBAL  GLOBAL
//! 2000    7.9     300.2
//! ```
//!
//! The second line is read and ignored. The last one is labelled `YEARS`
//! but carries the region of each column. Data rows follow with no header.

use super::{DataLine, ExtractedTable, TableExtractor, read_rows};
use crate::constants::{LABEL_GAS, LABEL_REGIONS, LABEL_UNITS};
use crate::error::{MagiccError, Result};
use crate::header::parse_header_annotations;
use crate::models::{ColumnLabel, FormatVersion, HeaderTag, MetadataValue};
use crate::table::LabeledTable;
use std::collections::BTreeMap;
use std::path::Path;

/// Number of label lines preceding the data rows
const LABEL_LINE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct Magicc7Extractor;

impl TableExtractor for Magicc7Extractor {
    fn format(&self) -> FormatVersion {
        FormatVersion::Magicc7
    }

    fn annotations(&self, header: &str) -> BTreeMap<HeaderTag, String> {
        parse_header_annotations(header)
    }

    fn extract(
        &self,
        path: &Path,
        data: &[DataLine<'_>],
        _entries: &BTreeMap<String, MetadataValue>,
    ) -> Result<ExtractedTable> {
        let mut label_lines = data.iter();
        let gases = read_label_line(path, label_lines.next(), Some(LABEL_GAS))?;
        let unused = read_label_line(path, label_lines.next(), None)?;
        let units = read_label_line(path, label_lines.next(), Some(LABEL_UNITS))?;
        let regions = read_label_line(path, label_lines.next(), Some(LABEL_REGIONS))?;

        for (name, tokens) in [("second", &unused), ("UNITS", &units), ("YEARS", &regions)] {
            if tokens.len() != gases.len() {
                return Err(MagiccError::invalid_format(
                    path,
                    format!(
                        "{} label line has {} columns but GAS has {}",
                        name,
                        tokens.len(),
                        gases.len()
                    ),
                ));
            }
        }

        let labels: Vec<ColumnLabel> = gases
            .iter()
            .zip(&regions)
            .map(|(gas, region)| ColumnLabel::new(*gas, *region))
            .collect();

        let (years, columns) = read_rows(path, &data[LABEL_LINE_COUNT..], labels.len())?;
        let table = LabeledTable::new(labels, years, columns)?;
        let units = extract_units(path, &gases, &units)?;

        Ok(ExtractedTable { table, units })
    }
}

/// Tokens following the leading label of a label line.
///
/// `expected` of `None` accepts any leading token.
fn read_label_line<'a>(
    path: &Path,
    line: Option<&DataLine<'a>>,
    expected: Option<&str>,
) -> Result<Vec<&'a str>> {
    let expected_label = expected.unwrap_or("<any label>");
    let line = line.ok_or_else(|| MagiccError::LabelMismatch {
        path: path.to_path_buf(),
        expected: expected_label.to_string(),
        found: "end of file".to_string(),
    })?;

    let tokens = line.tokens();
    let (label, values) = tokens
        .split_first()
        .map(|(label, values)| (*label, values.to_vec()))
        .unwrap_or(("", Vec::new()));

    if let Some(expected) = expected {
        if label != expected {
            return Err(MagiccError::LabelMismatch {
                path: path.to_path_buf(),
                expected: expected.to_string(),
                found: label.to_string(),
            });
        }
    }

    Ok(values)
}

/// Map each gas to its unit, rejecting a gas listed with two units
fn extract_units(path: &Path, gases: &[&str], units: &[&str]) -> Result<BTreeMap<String, String>> {
    let mut result: BTreeMap<String, String> = BTreeMap::new();

    for (gas, unit) in gases.iter().zip(units) {
        match result.get(*gas) {
            Some(existing) if existing != unit => {
                return Err(MagiccError::UnitConflict {
                    quantity: gas.to_string(),
                    path: path.to_path_buf(),
                });
            }
            Some(_) => {}
            None => {
                result.insert(gas.to_string(), unit.to_string());
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAGICC7_BANNER;
    use crate::reader::{InputReader, ParsedInput, RawDocument};

    fn magicc7_text(labels: &str, rows: &str) -> String {
        format!(
            "{banner}
  | | | |  some more banner art
Data: Historical emissions
Date: 2017-10-12
Source: Test suite
Contact: someone@example.org
Compiled by: A. Person
Description: CO2 and CH4

&THISFILE_SPECIFICATIONS
    THISFILE_DATACOLUMNS = 2
    THISFILE_DATTYPE = 'NOTSCEN7'
    THISFILE_REGIONMODE = 'NONE'
/
{labels}
{rows}",
            banner = MAGICC7_BANNER,
            labels = labels,
            rows = rows
        )
    }

    fn read(text: &str) -> Result<ParsedInput> {
        InputReader::new(RawDocument::from_text("TEST_EMMS.IN", text), Magicc7Extractor).read()
    }

    #[test]
    fn test_read_magicc7_file() {
        let text = magicc7_text(
            "   GAS     CO2     CH4\n   TODO    x       x\n   UNITS   GtC     Mt\n   YEARS   GLOBAL  GLOBAL",
            "   2000    7.9     300.2\n\n   2001    8.1     305.0\n",
        );
        let parsed = read(&text).unwrap();

        assert_eq!(parsed.format, FormatVersion::Magicc7);
        assert_eq!(
            parsed.table.labels(),
            &[
                ColumnLabel::new("CO2", "GLOBAL"),
                ColumnLabel::new("CH4", "GLOBAL")
            ]
        );
        assert_eq!(parsed.table.years().unwrap(), vec![2000.0, 2001.0]);
        assert_eq!(parsed.table.values("CH4", "GLOBAL").unwrap(), vec![300.2, 305.0]);

        let mut expected_units = BTreeMap::new();
        expected_units.insert("CO2".to_string(), "GtC".to_string());
        expected_units.insert("CH4".to_string(), "Mt".to_string());
        assert_eq!(parsed.metadata.units, expected_units);

        assert_eq!(parsed.metadata.annotation(HeaderTag::Date), Some("2017-10-12"));
        assert_eq!(parsed.metadata.annotation(HeaderTag::CompiledBy), Some("A. Person"));
        assert_eq!(
            parsed.metadata.get("dattype"),
            Some(&MetadataValue::from("NOTSCEN7"))
        );
        assert!(parsed.metadata.header.starts_with(MAGICC7_BANNER));
    }

    #[test]
    fn test_shared_gas_with_same_unit() {
        let text = magicc7_text(
            "GAS CO2 CO2\nTODO x x\nUNITS GtC GtC\nYEARS R5ASIA R5LAM",
            "2000 1.0 2.0\n",
        );
        let parsed = read(&text).unwrap();

        assert_eq!(parsed.metadata.units.len(), 1);
        assert_eq!(parsed.metadata.unit("CO2"), Some("GtC"));
        assert_eq!(parsed.table.regions(), vec!["R5ASIA", "R5LAM"]);
    }

    #[test]
    fn test_unit_conflict() {
        let text = magicc7_text(
            "GAS CO2 CO2\nTODO x x\nUNITS GtC MtCO2\nYEARS GLOBAL R5ASIA",
            "2000 1.0 2.0\n",
        );

        match read(&text).unwrap_err() {
            MagiccError::UnitConflict { quantity, path } => {
                assert_eq!(quantity, "CO2");
                assert_eq!(path, Path::new("TEST_EMMS.IN"));
            }
            other => panic!("Expected UnitConflict error, got {:?}", other),
        }
    }

    #[test]
    fn test_units_label_mismatch() {
        let text = magicc7_text(
            "GAS CO2 CH4\nTODO x x\nUNIT GtC Mt\nYEARS GLOBAL GLOBAL",
            "2000 1.0 2.0\n",
        );

        match read(&text).unwrap_err() {
            MagiccError::LabelMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, "UNITS");
                assert_eq!(found, "UNIT");
            }
            other => panic!("Expected LabelMismatch error, got {:?}", other),
        }
    }

    #[test]
    fn test_second_label_line_accepts_any_label() {
        let text = magicc7_text(
            "GAS CO2\nWHATEVER x\nUNITS GtC\nYEARS GLOBAL",
            "2000 1.0\n",
        );
        assert!(read(&text).is_ok());
    }

    #[test]
    fn test_missing_label_lines() {
        let text = magicc7_text("GAS CO2\nTODO x", "");
        match read(&text).unwrap_err() {
            MagiccError::LabelMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, "UNITS");
                assert_eq!(found, "end of file");
            }
            other => panic!("Expected LabelMismatch error, got {:?}", other),
        }
    }

    #[test]
    fn test_label_column_counts_must_align() {
        let text = magicc7_text(
            "GAS CO2 CH4\nTODO x\nUNITS GtC Mt\nYEARS GLOBAL GLOBAL",
            "2000 1.0 2.0\n",
        );
        let err = read(&text).unwrap_err();
        assert!(matches!(err, MagiccError::InvalidFormat { .. }));
        assert!(err.to_string().contains("second label line"));
    }

    #[test]
    fn test_extract_units_order_independent() {
        let units = extract_units(
            Path::new("TEST_EMMS.IN"),
            &["N2O", "CO2", "N2O"],
            &["MtN2ON", "GtC", "MtN2ON"],
        )
        .unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units["N2O"], "MtN2ON");
    }
}
