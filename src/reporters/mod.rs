//! Output reporters for depmap analysis results
//!
//! Supports two output formats:
//! - `text` - Terminal summary with colors
//! - `json` - The export document, machine-readable

pub mod json;
pub mod text;

use crate::graph::GraphSnapshot;
use crate::models::ParsedFile;
use anyhow::{anyhow, Result};
use std::str::FromStr;
use std::time::Duration;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Everything a reporter needs from one finished run
pub struct AnalysisReport<'a> {
    pub graph: &'a GraphSnapshot,
    pub files: &'a [ParsedFile],
    pub total_files: usize,
    pub total_elements: usize,
    pub processing_time: Duration,
}

/// Render a report using an OutputFormat enum
pub fn report_with_format(report: &AnalysisReport<'_>, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report, verbose),
        OutputFormat::Json => json::render(report),
    }
}
