//! Submission loader.
//!
//! Discovers submission files in the configured source directories and
//! parses each one. A file that cannot be read or parsed is skipped with a
//! warning; loading always continues with the next file.

use crate::config::SourceConfig;
use crate::models::Submission;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Why a submission file was left out.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Read { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}

/// Everything the loader found.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Parsed submissions in discovery order.
    pub submissions: Vec<Submission>,
    /// Files that matched but could not be loaded.
    pub skipped: Vec<LoadError>,
}

/// Loader over an ordered list of source directories.
pub struct SubmissionLoader {
    sources: Vec<SourceConfig>,
}

impl SubmissionLoader {
    /// Create a new loader.
    pub fn new(sources: Vec<SourceConfig>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    /// List matching files: sources in order, files by name within a source.
    ///
    /// Missing directories contribute nothing.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for source in &self.sources {
            if !source.path.is_dir() {
                debug!("Skipping missing source directory {}", source.path.display());
                continue;
            }

            let entries = WalkDir::new(&source.path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name();

            for entry in entries {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        debug!("Cannot read entry in {}: {}", source.path.display(), e);
                        continue;
                    }
                };

                if entry.file_type().is_file() && is_submission_file(source, entry.path()) {
                    files.push(entry.into_path());
                }
            }
        }

        files
    }

    /// Load and parse every matching file.
    pub fn load(&self) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();

        for path in self.scan() {
            match load_submission(&path) {
                Ok(submission) => {
                    debug!(
                        "Loaded {} ({} ballots)",
                        path.display(),
                        submission.results.len()
                    );
                    outcome.submissions.push(submission);
                }
                Err(e) => {
                    warn!("Skipping submission file: {}", e);
                    outcome.skipped.push(e);
                }
            }
        }

        info!(
            "Loaded {} submission files ({} skipped)",
            outcome.submissions.len(),
            outcome.skipped.len()
        );
        outcome
    }
}

/// Read and parse a single submission file.
pub fn load_submission(path: &Path) -> Result<Submission, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn is_submission_file(source: &SourceConfig, path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(&source.prefix) && name.ends_with(".json")
}
