//! Command-line interface components.

use crate::config::ReaderConfig;
use crate::constants::DEFAULT_PREVIEW_ROWS;
use crate::document::InputDocument;
use crate::models::HeaderTag;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "magicc-input")]
#[command(about = "Inspect MAGICC6 and MAGICC7 emissions and forcing input files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the metadata and leading rows of one input file
    Inspect {
        /// Path to the input file, e.g. run/HISTRCP_CO2I_EMIS.IN
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of table rows to print
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        head: usize,
    },
    /// Read every input file in a directory and report failures
    Scan {
        /// Directory to scan (defaults to the MAGICC run directory)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("magicc_input={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Run the selected command. Returns whether every file was read.
pub fn run(args: &Args) -> Result<bool> {
    match &args.command {
        Commands::Inspect { file, head } => {
            inspect(file, *head)?;
            Ok(true)
        }
        Commands::Scan { dir } => scan(dir.as_deref(), &ReaderConfig::default()),
    }
}

/// Split a file path into its directory and file name
fn split_path(file: &Path) -> Result<(PathBuf, String)> {
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Not a file path: {}", file.display()))?
        .to_string();
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name))
}

fn inspect(file: &Path, head: usize) -> Result<()> {
    let (dir, name) = split_path(file)?;
    let mut document = InputDocument::new(name);
    document
        .load(Some(&dir), None)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let metadata = document.metadata()?;
    let table = document.table()?;

    println!("{}", file.display().to_string().bright_green().bold());
    println!("  {} {}", "Format:".bright_cyan(), document.format()?);

    let (rows, columns) = table.shape();
    println!(
        "  {} {} years x {} columns",
        "Shape:".bright_cyan(),
        rows.to_string().bright_white(),
        columns.to_string().bright_white()
    );

    let annotations: Vec<_> = HeaderTag::ALL
        .iter()
        .filter_map(|tag| metadata.annotation(*tag).map(|value| (tag, value)))
        .collect();
    if !annotations.is_empty() {
        println!("\n{}", "Header".bright_yellow());
        for (tag, value) in annotations {
            println!("  {} {}", tag.label().bright_cyan(), value);
        }
    }

    println!("\n{}", "Namelist".bright_yellow());
    for (key, value) in &metadata.entries {
        if HeaderTag::ALL.iter().any(|tag| tag.key() == key.as_str()) {
            continue;
        }
        println!("  {} = {}", key.bright_cyan(), value);
    }

    println!("\n{}", "Units".bright_yellow());
    for (quantity, unit) in &metadata.units {
        println!("  {} {}", quantity.bright_cyan(), unit);
    }

    println!("\n{}", table.head(head));
    Ok(())
}

fn scan(dir: Option<&Path>, config: &ReaderConfig) -> Result<bool> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => config.resolve_run_dir()?,
    };

    let mut files = Vec::new();
    for extension in config.input_extensions() {
        let pattern = dir.join(format!("*.{}", extension));
        let pattern = pattern.to_string_lossy();
        let options = glob::MatchOptions {
            case_sensitive: false,
            ..Default::default()
        };
        for entry in glob::glob_with(&pattern, options)
            .with_context(|| format!("Invalid scan pattern {}", pattern))?
        {
            match entry {
                Ok(path) => files.push(path),
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
    }
    files.sort();
    files.dedup();

    println!(
        "{} {} input files in {}",
        "Found".bright_green(),
        files.len().to_string().bright_white().bold(),
        dir.display()
    );

    let mut failed = 0usize;
    for path in &files {
        let (dir, name) = split_path(path)?;
        let mut document = InputDocument::new(name.clone());
        match document.load(Some(&dir), None) {
            Ok(()) => {
                let (rows, columns) = document.shape()?;
                println!(
                    "  {} {} ({}, {} x {})",
                    "ok".bright_green(),
                    name,
                    document.format()?,
                    rows,
                    columns
                );
            }
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "failed".bright_red(), name, e);
            }
        }
    }

    if failed > 0 {
        println!(
            "{} {} of {} files",
            "Failed to read".bright_red().bold(),
            failed,
            files.len()
        );
    }

    Ok(failed == 0)
}
