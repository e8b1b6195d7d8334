//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// CrowdTally - crowd-test result statistics
///
/// Reads the ballots submitted from the crowd-test web page, tallies the
/// votes for each model photo variant, and writes a text report, a CSV of
/// every vote and a JSON summary.
///
/// Examples:
///   crowdtally
///   crowdtally --input ./results --output-dir ./statistics
///   crowdtally --config team.toml --no-print
///   crowdtally --dry-run
///   crowdtally --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directories to read submission files from (comma-separated or repeated)
    ///
    /// Every `*.json` file directly inside each directory is loaded.
    /// Replaces the sources from the configuration file.
    #[arg(
        short,
        long,
        value_name = "DIR",
        value_delimiter = ',',
        env = "CROWDTALLY_INPUT"
    )]
    pub input: Option<Vec<PathBuf>>,

    /// Directory the reports are written to
    ///
    /// Created if it does not exist.
    #[arg(short, long, value_name = "DIR", env = "CROWDTALLY_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .crowdtally.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not echo the text report to the console
    #[arg(long)]
    pub no_print: bool,

    /// Dry run: list the submission files that would be loaded and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .crowdtally.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Missing directories are fine, the loader skips them
        if let Some(ref inputs) = self.input {
            for input in inputs {
                if input.exists() && !input.is_dir() {
                    return Err(format!(
                        "Input path is not a directory: {}",
                        input.display()
                    ));
                }
            }
        }

        if let Some(ref output_dir) = self.output_dir {
            if output_dir.exists() && !output_dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    output_dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over both `--verbose` and a config file's `verbose = true`.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
