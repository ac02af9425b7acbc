//! Configuration management for locating input files.
//!
//! Input files normally live in the run directory of a MAGICC
//! installation. The directory is supplied through the [`RunDirectory`]
//! trait so callers and tests can provide it explicitly instead of relying
//! on a live installation.

use crate::constants::{
    DEFAULT_INSTALL_DIR_NAME, INPUT_FILE_EXTENSIONS, RUN_DIR_ENV, RUN_DIR_NAME,
};
use crate::error::{MagiccError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Source of the default directory searched for input files
pub trait RunDirectory: Send + Sync {
    fn run_dir(&self) -> Result<PathBuf>;
}

impl RunDirectory for PathBuf {
    fn run_dir(&self) -> Result<PathBuf> {
        Ok(self.clone())
    }
}

/// Reader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Explicit run directory, taking precedence over the environment
    pub run_dir: Option<PathBuf>,

    /// Extensions (without dot, case-insensitive) treated as input files
    /// when scanning a directory. Empty means the built-in list.
    pub extensions: Vec<String>,
}

impl ReaderConfig {
    /// Create configuration with an explicit run directory
    pub fn with_run_dir(mut self, run_dir: impl Into<PathBuf>) -> Self {
        self.run_dir = Some(run_dir.into());
        self
    }

    /// Create configuration with custom scan extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Extensions considered when scanning a directory
    pub fn input_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            INPUT_FILE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            self.extensions.clone()
        }
    }

    /// Resolve the run directory: explicit setting, then `MAGICC_RUN_DIR`,
    /// then the installation under the user data directory
    pub fn resolve_run_dir(&self) -> Result<PathBuf> {
        if let Some(run_dir) = &self.run_dir {
            return Ok(run_dir.clone());
        }

        if let Some(run_dir) = env::var_os(RUN_DIR_ENV).filter(|value| !value.is_empty()) {
            debug!("Using run directory from {}", RUN_DIR_ENV);
            return Ok(PathBuf::from(run_dir));
        }

        let data_dir = dirs::data_dir().ok_or_else(|| MagiccError::Configuration {
            message: format!(
                "Could not determine user data directory; set {} or pass a directory",
                RUN_DIR_ENV
            ),
        })?;

        Ok(data_dir.join(DEFAULT_INSTALL_DIR_NAME).join(RUN_DIR_NAME))
    }
}

impl RunDirectory for ReaderConfig {
    fn run_dir(&self) -> Result<PathBuf> {
        self.resolve_run_dir()
    }
}
