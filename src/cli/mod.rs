//! CLI definition and entry point

mod analyze;

pub use analyze::{analyze_path, AnalysisOutcome};

use crate::config::{load_project_config, AnalysisSettings, CliOverrides, MAX_WORKERS};
use crate::parsers::ParserRegistry;
use crate::reporters::OutputFormat;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > MAX_WORKERS {
        Err(format!("workers cannot exceed {}", MAX_WORKERS))
    } else {
        Ok(n)
    }
}

/// depmap - dependency maps for legacy codebases
#[derive(Parser, Debug)]
#[command(name = "depmap")]
#[command(
    version,
    about = "Map declarations and their dependencies in a PHP codebase",
    long_about = "depmap scans a source tree, extracts classes, functions, methods, \
properties and constants, resolves who uses whom, and reports hubs, \
orphans and the most complex elements. Nothing is executed.",
    after_help = "\
Examples:
  depmap .                         Summarise the current directory
  depmap app -v                    Full lists plus the function usage report
  depmap . -f json > deps.json     Export document on stdout
  depmap . -o deps.json            Summary on screen, export to a file
  depmap . --exclude legacy        Skip another directory name"
)]
pub struct Cli {
    /// Directory to analyse
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Show complete lists and the function usage report
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the JSON export document to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Additional directory name to skip (repeatable)
    #[arg(long = "exclude", value_name = "DIR")]
    pub exclude: Vec<String>,

    /// Source language
    #[arg(short, long)]
    pub language: Option<String>,

    /// Report format: text or json
    #[arg(short, long, value_parser = ["text", "json"])]
    pub format: Option<String>,

    /// Maximum concurrent file extractions (1-64)
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "DEPMAP_LOG_LEVEL", default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Print the supported languages and exit
    #[arg(long)]
    pub list_languages: bool,
}

impl Cli {
    fn overrides(&self) -> Result<CliOverrides> {
        Ok(CliOverrides {
            language: self.language.clone(),
            exclude_dirs: self.exclude.clone(),
            output_file: self.output.clone(),
            verbose: self.verbose,
            workers: self.workers,
            format: self.format.as_deref().map(OutputFormat::from_str).transpose()?,
        })
    }
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let registry = ParserRegistry::with_defaults();

    if cli.list_languages {
        for language in registry.languages() {
            println!("{}", language);
        }
        return Ok(());
    }

    let project_config = load_project_config(&cli.path);
    let settings = AnalysisSettings::resolve(cli.path.clone(), cli.overrides()?, project_config)?;
    tracing::debug!("Effective settings: {:?}", settings);

    analyze::run(&settings, &registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workers_bounds() {
        assert_eq!(parse_workers("1"), Ok(1));
        assert_eq!(parse_workers("64"), Ok(64));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("many").is_err());
    }

    #[test]
    fn test_defaults_leave_overrides_unset() {
        let cli = Cli::parse_from(["depmap"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.log_level, "warn");
        let overrides = cli.overrides().unwrap();
        assert!(overrides.format.is_none());
        assert!(overrides.workers.is_none());
        assert!(!overrides.verbose);
    }

    #[test]
    fn test_repeatable_exclude_and_format() {
        let cli = Cli::parse_from([
            "depmap", "src", "--exclude", "legacy", "--exclude", "build", "-f", "json", "-v",
        ]);
        let overrides = cli.overrides().unwrap();
        assert_eq!(overrides.exclude_dirs, vec!["legacy", "build"]);
        assert_eq!(overrides.format, Some(OutputFormat::Json));
        assert!(overrides.verbose);
    }

    #[test]
    fn test_invalid_workers_rejected_by_parser() {
        assert!(Cli::try_parse_from(["depmap", "--workers", "100"]).is_err());
    }
}
