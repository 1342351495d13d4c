//! JSON report writing.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AnalysisError, Result};
use crate::types::AnalysisReport;

/// Writes analysis reports into an output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the report as `<base_name>_analysis_report.json`.
    ///
    /// Creates the output directory if needed and returns the full path of
    /// the written file.
    pub fn write_report(&self, report: &AnalysisReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|err| {
            AnalysisError::ReportGenerationFailed(format!(
                "could not create output directory {}: {err}",
                self.output_dir.display()
            ))
        })?;

        let report_path = self
            .output_dir
            .join(format!("{base_name}_analysis_report.json"));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
