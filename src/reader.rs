//! Format dispatch and the shared reading pipeline.
//!
//! A file is read once into a [`RawDocument`], its first line decides the
//! [`FormatVersion`], and an [`InputReader`] drives the steps common to
//! both layouts: locating and parsing the namelist, collecting header
//! annotations and handing the data section to the format's
//! [`TableExtractor`].

pub mod magicc6;
pub mod magicc7;

use crate::error::{MagiccError, Result};
use crate::models::{FormatVersion, HeaderTag, Metadata, MetadataValue};
use crate::namelist::{locate_namelist, parse_namelist};
use crate::table::LabeledTable;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use magicc6::Magicc6Extractor;
pub use magicc7::Magicc7Extractor;

/// Lines of an input file as read from disk, terminators included
#[derive(Debug, Clone)]
pub struct RawDocument {
    path: PathBuf,
    lines: Vec<String>,
}

impl RawDocument {
    /// Read a file from disk. Bytes that are not UTF-8, as in legacy
    /// Latin-1 headers, are replaced rather than rejected.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        if let std::borrow::Cow::Owned(_) = text {
            warn!("{} is not valid UTF-8, replacing invalid bytes", path.display());
        }
        Ok(Self::from_text(path, &text))
    }

    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// First line, empty for an empty file
    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }

    pub fn format(&self) -> FormatVersion {
        FormatVersion::detect(self.first_line())
    }
}

/// A non-blank line of the data section, trimmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLine<'a> {
    /// 1-based line number within the file
    pub number: usize,
    pub text: &'a str,
}

impl<'a> DataLine<'a> {
    pub fn tokens(&self) -> Vec<&'a str> {
        self.text.split_whitespace().collect()
    }
}

/// Table and unit mapping decoded from a data section
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    pub table: LabeledTable,
    pub units: BTreeMap<String, String>,
}

/// Format-specific decoding of the data section
pub trait TableExtractor {
    fn format(&self) -> FormatVersion;

    /// Tagged fields from the prose header. Formats without tags keep the
    /// default.
    fn annotations(&self, _header: &str) -> BTreeMap<HeaderTag, String> {
        BTreeMap::new()
    }

    /// Decode the lines following the namelist
    fn extract(
        &self,
        path: &Path,
        data: &[DataLine<'_>],
        entries: &BTreeMap<String, MetadataValue>,
    ) -> Result<ExtractedTable>;
}

/// Result of reading one input file
#[derive(Debug, Clone)]
pub struct ParsedInput {
    pub format: FormatVersion,
    pub path: PathBuf,
    pub metadata: Metadata,
    pub table: LabeledTable,
}

/// Reads a document with one table extractor
pub struct InputReader<E> {
    document: RawDocument,
    extractor: E,
}

impl<E: TableExtractor> InputReader<E> {
    pub fn new(document: RawDocument, extractor: E) -> Self {
        Self {
            document,
            extractor,
        }
    }

    pub fn read(&self) -> Result<ParsedInput> {
        let path = self.document.path();
        let lines = self.document.lines();

        let bounds = locate_namelist(path, lines)?;
        let mut entries = parse_namelist(path, bounds.slice(lines))?;

        let header = lines[..bounds.start].concat();
        for (tag, value) in self.extractor.annotations(&header) {
            entries.insert(tag.key().to_string(), MetadataValue::Text(value));
        }

        let data = data_lines(lines, bounds.end + 1);
        let extracted = self.extractor.extract(path, &data, &entries)?;

        debug!(
            "Extracted {} table from {}: {} years x {} columns",
            self.extractor.format(),
            path.display(),
            extracted.table.height(),
            extracted.table.labels().len()
        );

        Ok(ParsedInput {
            format: self.extractor.format(),
            path: path.to_path_buf(),
            metadata: Metadata {
                header,
                entries,
                units: extracted.units,
            },
            table: extracted.table,
        })
    }
}

/// Read, detect and parse an input file
pub fn read_input_file(path: &Path) -> Result<ParsedInput> {
    let document = RawDocument::read(path)?;
    let format = document.format();
    debug!("Detected {} format for {}", format, path.display());

    match format {
        FormatVersion::Magicc6 => InputReader::new(document, Magicc6Extractor).read(),
        FormatVersion::Magicc7 => InputReader::new(document, Magicc7Extractor).read(),
    }
}

/// Non-blank lines from `start` onwards, trimmed
fn data_lines(lines: &[String], start: usize) -> Vec<DataLine<'_>> {
    lines
        .iter()
        .enumerate()
        .skip(start)
        .map(|(index, line)| DataLine {
            number: index + 1,
            text: line.trim(),
        })
        .filter(|line| !line.text.is_empty())
        .collect()
}

/// Parse `year value...` rows into the year index and column-major values
pub(crate) fn read_rows(
    path: &Path,
    rows: &[DataLine<'_>],
    width: usize,
) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    let mut years = Vec::with_capacity(rows.len());
    let mut columns = vec![Vec::with_capacity(rows.len()); width];

    for row in rows {
        let tokens = row.tokens();
        if tokens.len() != width + 1 {
            return Err(MagiccError::invalid_format(
                path,
                format!(
                    "line {}: expected a year and {} values, found {} fields",
                    row.number,
                    width,
                    tokens.len()
                ),
            ));
        }

        years.push(parse_number(path, row, tokens[0])?);
        for (column, token) in columns.iter_mut().zip(&tokens[1..]) {
            column.push(parse_number(path, row, token)?);
        }
    }

    Ok((years, columns))
}

/// Parse a number, accepting Fortran `D` exponents
fn parse_number(path: &Path, row: &DataLine<'_>, token: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .or_else(|_| token.replace(['d', 'D'], "e").parse::<f64>())
        .map_err(|_| {
            MagiccError::invalid_format(
                path,
                format!("line {}: '{}' is not a number", row.number, token),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAGICC7_BANNER;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_raw_document_keeps_line_terminators() {
        let document = RawDocument::from_text("A_B_C.IN", "first\r\nsecond\n\nlast");
        assert_eq!(document.lines(), &["first\r\n", "second\n", "\n", "last"]);
        assert_eq!(document.first_line(), "first\r\n");
        assert_eq!(RawDocument::from_text("A_B_C.IN", "").first_line(), "");
    }

    #[test]
    fn test_raw_document_reads_latin1_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("HISTRCP_CO2I_EMIS.IN");
        std::fs::write(
            &path,
            b"  11\n Compiled by M\xfcller\n&THISFILE_SPECIFICATIONS\nTHISFILE_UNITS = 'GtC'\n/\nYEARS GLOBAL\n1765 1.0\n",
        )
        .unwrap();

        let document = RawDocument::read(&path).unwrap();
        assert_eq!(document.lines().len(), 7);
        assert!(document.lines()[1].contains("M\u{fffd}ller"));

        let parsed = read_input_file(&path).unwrap();
        assert_eq!(parsed.metadata.unit("CO2I"), Some("GtC"));
        assert!(parsed.metadata.header.contains("Compiled by M"));
    }

    #[test]
    fn test_data_lines_drop_blanks() {
        let lines: Vec<String> = ["&N\n", "/\n", "  YEARS GLOBAL \n", "\n", "   \n", " 1765 1.0\n"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let data = data_lines(&lines, 2);

        assert_eq!(
            data,
            vec![
                DataLine {
                    number: 3,
                    text: "YEARS GLOBAL"
                },
                DataLine {
                    number: 6,
                    text: "1765 1.0"
                },
            ]
        );
    }

    #[test]
    fn test_read_rows() {
        let rows = [
            DataLine {
                number: 10,
                text: "2000 1.0 2.5D+01",
            },
            DataLine {
                number: 11,
                text: "2001 -1e-3 0",
            },
        ];
        let (years, columns) = read_rows(Path::new("X_CO2_Y.IN"), &rows, 2).unwrap();

        assert_eq!(years, vec![2000.0, 2001.0]);
        assert_eq!(columns, vec![vec![1.0, -0.001], vec![25.0, 0.0]]);
    }

    #[test]
    fn test_read_rows_rejects_ragged_and_text() {
        let ragged = [DataLine {
            number: 7,
            text: "2000 1.0",
        }];
        let err = read_rows(Path::new("X_CO2_Y.IN"), &ragged, 2).unwrap_err();
        assert!(err.to_string().contains("line 7"));

        let text = [DataLine {
            number: 8,
            text: "2000 abc",
        }];
        let err = read_rows(Path::new("X_CO2_Y.IN"), &text, 1).unwrap_err();
        assert!(matches!(err, MagiccError::InvalidFormat { .. }));
        assert!(err.to_string().contains("'abc'"));
    }

    #[test]
    fn test_read_input_file_dispatches_on_banner() {
        let dir = tempfile::TempDir::new().unwrap();

        let v6_path = dir.path().join("HISTRCP_CO2I_EMIS.IN");
        std::fs::write(
            &v6_path,
            "  11\n &THISFILE_SPECIFICATIONS\n THISFILE_UNITS = \"GtC\"\n /\n YEARS GLOBAL\n 1765 0.003\n",
        )
        .unwrap();
        let v6 = read_input_file(&v6_path).unwrap();
        assert_eq!(v6.format, FormatVersion::Magicc6);
        assert_eq!(v6.metadata.unit("CO2I"), Some("GtC"));

        let v7_path = dir.path().join("TEST_EMMS.IN");
        std::fs::write(
            &v7_path,
            format!(
                "{}\n&THISFILE_SPECIFICATIONS\n THISFILE_DATACOLUMNS = 1\n/\nGAS CO2\nTODO x\nUNITS GtC\nYEARS GLOBAL\n2000 1.0\n",
                MAGICC7_BANNER
            ),
        )
        .unwrap();
        assert_eq!(
            read_input_file(&v7_path).unwrap().format,
            FormatVersion::Magicc7
        );
    }

    #[test]
    fn test_header_is_verbatim() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "  11\n   HISTORICAL EMISSIONS  \n&THISFILE_SPECIFICATIONS\nTHISFILE_UNITS = 'GtC'\n/\nYEARS GLOBAL\n1765 1.0\n"
        )
        .unwrap();

        let document = RawDocument::read(file.path()).unwrap();
        let parsed = InputReader::new(
            RawDocument::from_text("HISTRCP_CO2I_EMIS.IN", &document.lines().concat()),
            Magicc6Extractor,
        )
        .read()
        .unwrap();

        assert_eq!(parsed.metadata.header, "  11\n   HISTORICAL EMISSIONS  \n");
    }

    #[test]
    fn test_missing_namelist_names_file() {
        let document = RawDocument::from_text("HISTRCP_CO2I_EMIS.IN", "YEARS GLOBAL\n1765 1.0\n");
        let err = InputReader::new(document, Magicc6Extractor)
            .read()
            .unwrap_err();

        match err {
            MagiccError::NamelistNotFound { path } => {
                assert_eq!(path, PathBuf::from("HISTRCP_CO2I_EMIS.IN"));
            }
            other => panic!("Expected NamelistNotFound error, got {:?}", other),
        }
    }
}
