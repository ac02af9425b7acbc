//! MAGICC6 data section decoding.
//!
//! MAGICC6 files hold a single quantity, named by the second underscore
//! token of the file name (`HISTRCP_CO2I_EMIS.IN` holds `CO2I`). The data
//! section opens with a header row of regions and the namelist `units`
//! entry applies to every column.

use super::{DataLine, ExtractedTable, TableExtractor, read_rows};
use crate::constants::UNITS_KEY;
use crate::error::{MagiccError, Result};
use crate::models::{ColumnLabel, FormatVersion, MetadataValue};
use crate::table::LabeledTable;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct Magicc6Extractor;

impl TableExtractor for Magicc6Extractor {
    fn format(&self) -> FormatVersion {
        FormatVersion::Magicc6
    }

    fn extract(
        &self,
        path: &Path,
        data: &[DataLine<'_>],
        entries: &BTreeMap<String, MetadataValue>,
    ) -> Result<ExtractedTable> {
        let quantity = quantity_from_file_name(path)?;

        let (header_row, rows) = data
            .split_first()
            .ok_or_else(|| MagiccError::invalid_format(path, "data section has no header row"))?;

        // The first header token names the year column
        let labels: Vec<ColumnLabel> = header_row
            .tokens()
            .into_iter()
            .skip(1)
            .map(|region| ColumnLabel::new(quantity.clone(), region))
            .collect();

        if labels.is_empty() {
            return Err(MagiccError::invalid_format(
                path,
                format!("line {}: header row names no regions", header_row.number),
            ));
        }

        let (years, columns) = read_rows(path, rows, labels.len())?;
        let table = LabeledTable::new(labels, years, columns)?;

        let unit = entries
            .get(UNITS_KEY)
            .ok_or_else(|| MagiccError::invalid_format(path, "namelist has no units entry"))?;

        let mut units = BTreeMap::new();
        units.insert(quantity, unit.to_string());

        Ok(ExtractedTable { table, units })
    }
}

/// Quantity encoded as the second underscore-delimited token of the file name
pub fn quantity_from_file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('_').nth(1))
        .filter(|quantity| !quantity.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            MagiccError::invalid_format(path, "file name does not encode a quantity")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{InputReader, RawDocument};

    const HISTRCP_CO2I_EMIS: &str = "  11
    1765    2005       5      1       1
   HISTORICAL CO2 FOSSIL FUEL+CEMENT EMISSIONS, GtC
 &THISFILE_SPECIFICATIONS
 THISFILE_DATACOLUMNS = 1
 THISFILE_FIRSTYEAR = 1765
 THISFILE_LASTYEAR = 1767
 THISFILE_ANNUALSTEPS = 1
 THISFILE_UNITS = 'GtC'
 /
     YEARS             GLOBAL
      1765      0.0030000

      1766      0.0030000
      1767      0.0040000
";

    fn read(name: &str, text: &str) -> Result<crate::reader::ParsedInput> {
        InputReader::new(RawDocument::from_text(name, text), Magicc6Extractor).read()
    }

    #[test]
    fn test_quantity_from_file_name() {
        assert_eq!(
            quantity_from_file_name(Path::new("/run/HISTRCP_CO2I_EMIS.IN")).unwrap(),
            "CO2I"
        );
        assert_eq!(
            quantity_from_file_name(Path::new("RCP26_CH4_CONC.IN")).unwrap(),
            "CH4"
        );
        assert!(quantity_from_file_name(Path::new("NOUNDERSCORE.IN")).is_err());
        assert!(quantity_from_file_name(Path::new("A__B.IN")).is_err());
    }

    #[test]
    fn test_read_magicc6_file() {
        let parsed = read("HISTRCP_CO2I_EMIS.IN", HISTRCP_CO2I_EMIS).unwrap();

        assert_eq!(parsed.format, FormatVersion::Magicc6);
        assert_eq!(parsed.table.labels(), &[ColumnLabel::new("CO2I", "GLOBAL")]);
        assert_eq!(parsed.table.years().unwrap(), vec![1765.0, 1766.0, 1767.0]);
        assert_eq!(
            parsed.table.values("CO2I", "GLOBAL").unwrap(),
            vec![0.003, 0.003, 0.004]
        );

        let mut expected_units = BTreeMap::new();
        expected_units.insert("CO2I".to_string(), "GtC".to_string());
        assert_eq!(parsed.metadata.units, expected_units);

        assert_eq!(
            parsed.metadata.get("firstyear"),
            Some(&MetadataValue::Integer(1765))
        );
        assert!(parsed.metadata.header.starts_with("  11\n"));
        assert!(parsed.metadata.header.ends_with("GtC\n"));
    }

    #[test]
    fn test_every_column_uses_file_quantity() {
        let text = "\
&THISFILE_SPECIFICATIONS
THISFILE_UNITS = 'Mt'
/
YEARS  GLOBAL  R5OECD  R5ASIA
2000   1.0     2.0     3.0
";
        let parsed = read("RCP45_SOX_EMIS.IN", text).unwrap();

        assert_eq!(parsed.table.shape(), (1, 3));
        assert!(parsed.table.labels().iter().all(|label| label.quantity == "SOX"));
        assert_eq!(parsed.table.regions(), vec!["GLOBAL", "R5OECD", "R5ASIA"]);
        assert_eq!(parsed.metadata.unit("SOX"), Some("Mt"));
    }

    #[test]
    fn test_missing_units_entry() {
        let text = "&THISFILE_SPECIFICATIONS\nTHISFILE_DATACOLUMNS = 1\n/\nYEARS GLOBAL\n2000 1.0\n";
        let err = read("HISTRCP_CO2I_EMIS.IN", text).unwrap_err();
        assert!(matches!(err, MagiccError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_header_row() {
        let text = "&THISFILE_SPECIFICATIONS\nTHISFILE_UNITS = 'GtC'\n/\n\n";
        let err = read("HISTRCP_CO2I_EMIS.IN", text).unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }

    #[test]
    fn test_no_header_annotations() {
        let text = "Date: 2017\n&THISFILE_SPECIFICATIONS\nTHISFILE_UNITS = 'GtC'\n/\nYEARS GLOBAL\n2000 1.0\n";
        let parsed = read("HISTRCP_CO2I_EMIS.IN", text).unwrap();
        assert_eq!(parsed.metadata.get("date"), None);
        assert_eq!(parsed.metadata.header, "Date: 2017\n");
    }
}
