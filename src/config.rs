//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.crowdtally.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".crowdtally.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where submission files are read from.
    #[serde(default)]
    pub input: InputConfig,

    /// Where reports are written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log at debug level unless `--quiet` is given.
    #[serde(default)]
    pub verbose: bool,

    /// Echo the text report to stdout once it is written.
    #[serde(default = "default_true")]
    pub print_report: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            print_report: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Submission sources, searched in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
        }
    }
}

/// One directory of submission files.
///
/// A file belongs to the source when its name starts with `prefix` and ends in `.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub prefix: String,
}

impl SourceConfig {
    pub fn new(path: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.to_string(),
        }
    }

    /// Human-readable pattern, e.g. `result_*.json`.
    pub fn pattern(&self) -> String {
        format!("{}*.json", self.prefix)
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        // Files saved by the submission endpoint
        SourceConfig::new("crowdtest/results", ""),
        // Files downloaded by voters from the web page
        SourceConfig::new("crowdtest", "result_"),
    ]
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, created when missing.
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    #[serde(default = "default_report_file")]
    pub report_file: String,

    #[serde(default = "default_csv_file")]
    pub csv_file: String,

    #[serde(default = "default_json_file")]
    pub json_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            report_file: default_report_file(),
            csv_file: default_csv_file(),
            json_file: default_json_file(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("crowdtest/statistics")
}

fn default_report_file() -> String {
    "report.txt".to_string()
}

fn default_csv_file() -> String {
    "detailed_records.csv".to_string()
}

fn default_json_file() -> String {
    "summary.json".to_string()
}

impl OutputConfig {
    pub fn report_path(&self) -> PathBuf {
        self.directory.join(&self.report_file)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.directory.join(&self.csv_file)
    }

    pub fn json_path(&self) -> PathBuf {
        self.directory.join(&self.json_file)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref inputs) = args.input {
            self.input.sources = inputs.iter().map(|p| SourceConfig::new(p, "")).collect();
        }

        if let Some(ref output_dir) = args.output_dir {
            self.output.directory = output_dir.clone();
        }

        if args.verbose {
            self.general.verbose = true;
        }

        if args.no_print {
            self.general.print_report = false;
        }
    }

    /// Input directories in search order.
    pub fn input_directories(&self) -> Vec<&Path> {
        self.input.sources.iter().map(|s| s.path.as_path()).collect()
    }

    pub fn output_directory(&self) -> &Path {
        &self.output.directory
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.general.print_report);
        assert_eq!(
            config.input_directories(),
            vec![Path::new("crowdtest/results"), Path::new("crowdtest")]
        );
        assert_eq!(config.input.sources[1].pattern(), "result_*.json");
        assert_eq!(
            config.output.report_path(),
            PathBuf::from("crowdtest/statistics/report.txt")
        );
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
print_report = false

[[input.sources]]
path = "/data/results"

[[input.sources]]
path = "/data/downloads"
prefix = "result_"

[output]
directory = "/data/stats"
csv_file = "rows.csv"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(!config.general.print_report);
        assert_eq!(config.input.sources.len(), 2);
        assert_eq!(config.input.sources[0].prefix, "");
        assert_eq!(config.input.sources[1].prefix, "result_");
        assert_eq!(config.output_directory(), Path::new("/data/stats"));
        assert_eq!(config.output.csv_path(), PathBuf::from("/data/stats/rows.csv"));
        assert_eq!(config.output.json_file, "summary.json");
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = make_args();
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        let config = Config::default();
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::INFO);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = make_args();
        args.input = Some(vec![PathBuf::from("a"), PathBuf::from("b")]);
        args.output_dir = Some(PathBuf::from("out"));
        args.no_print = true;

        config.merge_with_args(&args);

        assert_eq!(
            config.input.sources,
            vec![SourceConfig::new("a", ""), SourceConfig::new("b", "")]
        );
        assert_eq!(config.output_directory(), Path::new("out"));
        assert!(!config.general.print_report);
    }

    #[test]
    fn test_merge_keeps_config_without_args() {
        let mut config = Config::default();
        config.merge_with_args(&make_args());

        assert_eq!(config.input.sources.len(), 2);
        assert!(config.general.print_report);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[[input.sources]]"));
        assert!(toml_str.contains("[output]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.input.sources, Config::default().input.sources);
    }
}
