//! One statistics run: load submissions, aggregate, write the reports.
//!
//! Console output stays in `main`; this module only returns what happened.

use crate::analysis::{self, Aggregate};
use crate::config::Config;
use crate::loader::{LoadError, SubmissionLoader};
use crate::report::{self, WrittenReports};
use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{debug, info};

/// Result of a statistics run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing could be loaded. No output directory or file was touched.
    NoSubmissions { skipped: Vec<LoadError> },
    /// All three reports were written.
    Completed {
        loaded: usize,
        skipped: Vec<LoadError>,
        aggregate: Aggregate,
        written: WrittenReports,
    },
}

/// Run the statistics pipeline for `config`.
///
/// Unreadable submission files are skipped. Failing to write any report is an error.
pub fn run(config: &Config, generated_at: DateTime<Local>) -> Result<RunOutcome> {
    let loader = SubmissionLoader::new(config.input.sources.clone());
    let outcome = loader.load();

    if outcome.submissions.is_empty() {
        info!("No submission files found, no reports written");
        return Ok(RunOutcome::NoSubmissions {
            skipped: outcome.skipped,
        });
    }

    let aggregate = analysis::aggregate(&outcome.submissions);
    debug!(
        "Aggregated {} evaluations from {} voters",
        aggregate.total_evaluations, aggregate.total_voters
    );

    let written = report::write_reports(&aggregate, &config.output, generated_at)?;

    Ok(RunOutcome::Completed {
        loaded: outcome.submissions.len(),
        skipped: outcome.skipped,
        aggregate,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_for(sources: Vec<SourceConfig>, output: &Path) -> Config {
        let mut config = Config::default();
        config.input.sources = sources;
        config.output.directory = output.to_path_buf();
        config
    }

    #[test]
    fn test_no_submissions_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("statistics");
        let config = config_for(
            vec![
                SourceConfig::new(dir.path().join("results"), ""),
                SourceConfig::new(dir.path(), "result_"),
            ],
            &output,
        );

        let outcome = run(&config, Local::now()).unwrap();

        assert!(matches!(outcome, RunOutcome::NoSubmissions { ref skipped } if skipped.is_empty()));
        assert!(!output.exists());
    }

    #[test]
    fn test_only_broken_files_writes_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let output = dir.path().join("statistics");
        let config = config_for(vec![SourceConfig::new(dir.path(), "")], &output);

        match run(&config, Local::now()).unwrap() {
            RunOutcome::NoSubmissions { skipped } => assert_eq!(skipped.len(), 1),
            other => panic!("expected no submissions, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_fixture_run_writes_reports() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("statistics");
        let config = config_for(
            vec![
                SourceConfig::new(fixtures.join("results"), ""),
                SourceConfig::new(&fixtures, "result_"),
            ],
            &output,
        );

        match run(&config, Local::now()).unwrap() {
            RunOutcome::Completed {
                loaded,
                skipped,
                aggregate,
                written,
            } => {
                assert_eq!(loaded, 3);
                assert_eq!(skipped.len(), 1);
                assert_eq!(aggregate.total_evaluations, 7);
                assert!(written.report_path.exists());
                assert!(written.csv_path.exists());
                assert!(written.json_path.exists());
            }
            other => panic!("expected a completed run, got {:?}", other),
        }
    }
}
