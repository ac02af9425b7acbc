//! Lazy-loading access to a single input file.
//!
//! An [`InputDocument`] is created with only a file name, read from disk
//! once the directory holding it is known, and then answers table queries
//! against the parsed content.
//!
//! ```no_run
//! use magicc_input::InputDocument;
//! use std::path::Path;
//!
//! # fn example() -> magicc_input::Result<()> {
//! let mut document = InputDocument::new("HISTRCP_CO2I_EMIS.IN");
//! document.load(Some(Path::new("/opt/magicc/run")), None)?;
//!
//! let emissions = document.values("CO2I", "GLOBAL")?;
//! println!("{} years, unit {:?}", emissions.len(), document.metadata()?.unit("CO2I"));
//! # Ok(())
//! # }
//! ```

use crate::config::{ReaderConfig, RunDirectory};
use crate::error::{MagiccError, Result};
use crate::models::{ColumnLabel, FormatVersion, Metadata};
use crate::reader::{ParsedInput, read_input_file};
use crate::table::LabeledTable;
use polars::prelude::Series;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// An input file that is read on demand
pub struct InputDocument {
    name: Option<String>,
    run_directory: Arc<dyn RunDirectory>,
    content: Option<ParsedInput>,
}

impl Default for InputDocument {
    fn default() -> Self {
        Self {
            name: None,
            run_directory: Arc::new(ReaderConfig::default()),
            content: None,
        }
    }
}

impl fmt::Debug for InputDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputDocument")
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl InputDocument {
    /// Document for a file name such as `HISTRCP_CO2I_EMIS.IN`. Nothing is
    /// read until [`load`](Self::load) is called.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Directory searched when `load` is given none
    pub fn with_run_directory(mut self, run_directory: impl RunDirectory + 'static) -> Self {
        self.run_directory = Arc::new(run_directory);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Read the file from disk.
    ///
    /// `search_dir` defaults to the run directory and `name_override`
    /// replaces the file name given at construction. Loading again re-reads
    /// the file; a failed load leaves earlier content in place.
    pub fn load(&mut self, search_dir: Option<&Path>, name_override: Option<&str>) -> Result<()> {
        let dir = match search_dir {
            Some(dir) => dir.to_path_buf(),
            None => self.run_directory.run_dir()?,
        };

        if let Some(name) = name_override {
            self.name = Some(name.to_string());
        }

        let name = self.name.as_deref().ok_or_else(|| MagiccError::Configuration {
            message: "No input file name given".to_string(),
        })?;

        let path = dir.join(name);
        if !path.exists() {
            return Err(MagiccError::FileNotFound { path });
        }

        let parsed = read_input_file(&path)?;
        info!(
            "Loaded {} input {} ({} years, {} columns)",
            parsed.format,
            path.display(),
            parsed.table.height(),
            parsed.table.labels().len()
        );
        self.content = Some(parsed);
        Ok(())
    }

    /// Writing input files is not supported.
    pub fn save(&self, _path: &Path) -> Result<()> {
        Err(MagiccError::WriteUnsupported)
    }

    fn loaded(&self) -> Result<&ParsedInput> {
        self.content.as_ref().ok_or_else(|| MagiccError::NotLoaded {
            name: self.name.clone().unwrap_or_else(|| "<unnamed>".to_string()),
        })
    }

    pub fn format(&self) -> Result<FormatVersion> {
        Ok(self.loaded()?.format)
    }

    /// Full path the content was read from
    pub fn path(&self) -> Result<&Path> {
        Ok(&self.loaded()?.path)
    }

    pub fn metadata(&self) -> Result<&Metadata> {
        Ok(&self.loaded()?.metadata)
    }

    pub fn table(&self) -> Result<&LabeledTable> {
        Ok(&self.loaded()?.table)
    }

    /// Index access by quantity, e.g. `document.quantity("CO2")`
    pub fn quantity(&self, quantity: &str) -> Result<LabeledTable> {
        self.table()?.quantity(quantity)
    }

    pub fn column(&self, quantity: &str, region: &str) -> Result<Series> {
        self.table()?.column(quantity, region)
    }

    pub fn values(&self, quantity: &str, region: &str) -> Result<Vec<f64>> {
        self.table()?.values(quantity, region)
    }

    pub fn value(&self, year: f64, quantity: &str, region: &str) -> Result<Option<f64>> {
        self.table()?.value(year, quantity, region)
    }

    pub fn years(&self) -> Result<Vec<f64>> {
        self.table()?.years()
    }

    pub fn labels(&self) -> Result<&[ColumnLabel]> {
        Ok(self.table()?.labels())
    }

    pub fn quantities(&self) -> Result<Vec<&str>> {
        Ok(self.table()?.quantities())
    }

    pub fn regions(&self) -> Result<Vec<&str>> {
        Ok(self.table()?.regions())
    }

    pub fn shape(&self) -> Result<(usize, usize)> {
        Ok(self.table()?.shape())
    }

    pub fn sum(&self, quantity: &str, region: &str) -> Result<Option<f64>> {
        self.table()?.sum(quantity, region)
    }

    pub fn mean(&self, quantity: &str, region: &str) -> Result<Option<f64>> {
        self.table()?.mean(quantity, region)
    }

    pub fn between_years(&self, start: f64, end: f64) -> Result<LabeledTable> {
        self.table()?.between_years(start, end)
    }
}
