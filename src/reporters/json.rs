//! JSON reporter
//!
//! The export document wraps the graph serialisation with run totals.

use super::AnalysisReport;
use crate::graph::GraphSnapshot;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    pub graph: &'a GraphSnapshot,
    pub total_files: usize,
    pub total_elements: usize,
    /// Nanoseconds
    pub processing_time: u64,
    pub generated_at: DateTime<Utc>,
}

impl<'a> ExportDocument<'a> {
    pub fn new(report: &AnalysisReport<'a>) -> Self {
        Self {
            graph: report.graph,
            total_files: report.total_files,
            total_elements: report.total_elements,
            processing_time: u64::try_from(report.processing_time.as_nanos()).unwrap_or(u64::MAX),
            generated_at: Utc::now(),
        }
    }
}

/// Render the export document as pretty JSON
pub fn render(report: &AnalysisReport<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportDocument::new(report))?)
}

/// Write the export document to `path`, creating parent directories
pub fn export_to_file(report: &AnalysisReport<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = render(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
