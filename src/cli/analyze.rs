//! The analysis run: discover, extract, resolve, report

use crate::config::AnalysisSettings;
use crate::discovery::collect_files;
use crate::graph::{build_dependency_graph, GraphSnapshot, ResolveStats};
use crate::models::ParsedFile;
use crate::parsers::{extract_files, LanguageParser, ParserRegistry};
use crate::progress::{bar_style, spinner_style, NoProgress};
use crate::reporters::{self, json, AnalysisReport, OutputFormat};
use anyhow::Result;
use console::style;
use indicatif::ProgressBar;
use std::time::{Duration, Instant};
use tracing::info;

/// Everything produced by one analysis, before rendering
pub struct AnalysisOutcome {
    pub files: Vec<ParsedFile>,
    pub graph: GraphSnapshot,
    pub stats: ResolveStats,
    pub total_files: usize,
    pub total_elements: usize,
    pub processing_time: Duration,
}

impl AnalysisOutcome {
    pub fn report(&self) -> AnalysisReport<'_> {
        AnalysisReport {
            graph: &self.graph,
            files: &self.files,
            total_files: self.total_files,
            total_elements: self.total_elements,
            processing_time: self.processing_time,
        }
    }
}

fn spinner(show: bool, message: &'static str) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Run discovery, extraction and graph building for `settings.root`
pub fn analyze_path(
    settings: &AnalysisSettings,
    parser: &dyn LanguageParser,
    show_progress: bool,
) -> Result<AnalysisOutcome> {
    let start = Instant::now();

    let walk_spinner = spinner(show_progress, "Discovering source files...");
    let discovered = collect_files(&settings.root, parser.extensions(), &settings.excluded_dirs)?;
    let total_bytes: u64 = discovered.iter().map(|f| f.size).sum();
    walk_spinner.finish_with_message(format!(
        "{}Found {} files ({:.2} MB)",
        style("✓ ").green(),
        style(discovered.len()).cyan(),
        total_bytes as f64 / (1024.0 * 1024.0)
    ));

    let (files, extraction) = if show_progress {
        let parse_bar = ProgressBar::new(discovered.len() as u64);
        parse_bar.set_style(bar_style());
        parse_bar.set_message("Extracting declarations...");
        let result = extract_files(parser, &discovered, settings.workers, &parse_bar);
        parse_bar.finish_with_message(format!(
            "{}Extracted {} files",
            style("✓ ").green(),
            style(result.1.parsed_files).cyan()
        ));
        result
    } else {
        extract_files(parser, &discovered, settings.workers, &NoProgress)
    };
    let total_elements: usize = files.iter().map(|f| f.declarations.len()).sum();

    let graph_spinner = spinner(show_progress, "Resolving dependencies...");
    let (graph, stats) = build_dependency_graph(&files);
    let snapshot = graph.snapshot();
    graph_spinner.finish_with_message(format!(
        "{}Built graph: {} nodes, {} dependencies",
        style("✓ ").green(),
        style(snapshot.total_nodes).cyan(),
        style(snapshot.total_edges).cyan()
    ));

    let processing_time = start.elapsed();
    info!(
        "Analysed {} files ({} unreadable), {} elements in {:?}",
        extraction.total_files, extraction.read_errors, total_elements, processing_time
    );

    Ok(AnalysisOutcome {
        files,
        graph: snapshot,
        stats,
        total_files: discovered.len(),
        total_elements,
        processing_time,
    })
}

/// Analyse, print the report and write the export file if requested
pub fn run(settings: &AnalysisSettings, registry: &ParserRegistry) -> Result<()> {
    let parser = registry.get(&settings.language)?;
    let is_text = settings.format == OutputFormat::Text;

    if is_text {
        println!("\n{}", style("depmap").bold());
        println!("Analyzing: {}\n", style(settings.root.display()).cyan());
    }

    let outcome = analyze_path(settings, parser, is_text)?;
    let report = outcome.report();

    let rendered = reporters::report_with_format(&report, settings.format, settings.verbose)?;
    println!("{}", rendered);

    if let Some(path) = &settings.output_file {
        json::export_to_file(&report, path)?;
        let message = format!(
            "{}Analysis exported to {}",
            style("✓ ").green(),
            style(path.display()).cyan()
        );
        // Keep stdout a single JSON document
        if is_text {
            println!("{}", message);
        } else {
            eprintln!("{}", message);
        }
    }

    Ok(())
}
