//! Report generation.
//!
//! Three independent projections of the same [`Aggregate`]: a text report,
//! a CSV of detailed records and a JSON summary.

pub mod csv;
pub mod generator;
pub mod json;

pub use csv::generate_csv;
pub use generator::generate_text_report;
pub use json::generate_json_report;

use crate::analysis::Aggregate;
use crate::config::OutputConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths of the files written by [`write_reports`], plus the rendered text report.
#[derive(Debug, Clone)]
pub struct WrittenReports {
    pub report_path: PathBuf,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
    pub text_report: String,
}

/// Render all three reports and write them into the output directory.
///
/// The directory is created if missing. Any failure is fatal.
pub fn write_reports(
    agg: &Aggregate,
    output: &OutputConfig,
    generated_at: DateTime<Local>,
) -> Result<WrittenReports> {
    std::fs::create_dir_all(&output.directory).with_context(|| {
        format!(
            "Failed to create output directory {}",
            output.directory.display()
        )
    })?;

    let text_report = generate_text_report(agg, generated_at);
    let report_path = output.report_path();
    write_file(&report_path, &text_report)?;

    let csv_path = output.csv_path();
    write_file(&csv_path, &generate_csv(agg))?;

    let json_path = output.json_path();
    write_file(&json_path, &generate_json_report(agg, generated_at)?)?;

    info!("Reports written to {}", output.directory.display());

    Ok(WrittenReports {
        report_path,
        csv_path,
        json_path,
        text_report,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
