//! Application constants for the MAGICC input reader
//!
//! Fixed markers, labels and defaults shared by the format readers,
//! the configuration layer and the CLI.

// =============================================================================
// Format Detection
// =============================================================================

/// ASCII-art banner found on the first line of MAGICC7 input files
pub const MAGICC7_BANNER: &str = ".__  __          _____ _____ _____ _____   ______   ______ __  __ _____  _____  _____ _   _";

// =============================================================================
// Embedded Namelist
// =============================================================================

/// A line opening the embedded namelist starts with this character
pub const NAMELIST_OPEN: char = '&';

/// A line closing the embedded namelist starts with this character
pub const NAMELIST_CLOSE: char = '/';

/// Separator between the namespace prefix and the visible key name
pub const NAMESPACE_SEPARATOR: char = '_';

/// Namelist entry holding the unit of a MAGICC6 file
pub const UNITS_KEY: &str = "units";

// =============================================================================
// Table Layout
// =============================================================================

/// MAGICC7 label line carrying the gas of each column
pub const LABEL_GAS: &str = "GAS";

/// MAGICC7 label line carrying the unit of each column
pub const LABEL_UNITS: &str = "UNITS";

/// MAGICC7 label line carrying the region of each column.
///
/// The files label this line `YEARS` even though it holds regions.
pub const LABEL_REGIONS: &str = "YEARS";

/// Name of the year index column in parsed tables
pub const YEAR_COLUMN: &str = "YEAR";

/// Separator used to build frame column names from (quantity, region) labels
pub const COLUMN_LABEL_SEPARATOR: char = '|';

// =============================================================================
// Run Directory Discovery
// =============================================================================

/// Environment variable overriding the default run directory
pub const RUN_DIR_ENV: &str = "MAGICC_RUN_DIR";

/// Directory under the user data directory holding a MAGICC installation
pub const DEFAULT_INSTALL_DIR_NAME: &str = "magicc";

/// Working directory inside a MAGICC installation
pub const RUN_DIR_NAME: &str = "run";

/// File extensions recognised as MAGICC input files
pub const INPUT_FILE_EXTENSIONS: &[&str] = &["IN", "SCEN7"];

// =============================================================================
// CLI Defaults
// =============================================================================

/// Rows of the table printed by `inspect`
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Largest `n` accepted in an `n*value` namelist repeat
pub const MAX_REPEAT_COUNT: usize = 100_000;
