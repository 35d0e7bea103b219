//! Project-level configuration support
//!
//! Loads per-project configuration from `depmap.toml`, `.depmap.json`,
//! or `.depmap.yaml` / `.depmap.yml` in the analysed root.
//!
//! # Configuration Format
//!
//! ```toml
//! # depmap.toml
//! language = "php"
//! exclude_dirs = ["generated", "legacy"]
//! output_file = "reports/deps.json"
//! verbose = false
//! workers = 8
//! format = "text"
//! ```

use crate::discovery::merge_excluded_dirs;
use crate::parsers::DEFAULT_MAX_CONCURRENCY;
use crate::reporters::OutputFormat;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

pub const DEFAULT_LANGUAGE: &str = "php";

/// Written when verbose output is requested without an explicit file
pub const DEFAULT_OUTPUT_FILE: &str = "depmap-results.json";

pub const MAX_WORKERS: usize = 64;

/// Contents of a project config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    /// Source dialect, e.g. `php`
    #[serde(default)]
    pub language: Option<String>,

    /// Extra directory names to skip, added to the built-in list
    #[serde(default, alias = "excludeDirs")]
    pub exclude_dirs: Vec<String>,

    /// Where to write the JSON export
    #[serde(default, alias = "outputFile")]
    pub output_file: Option<PathBuf>,

    #[serde(default)]
    pub verbose: bool,

    /// Extraction concurrency ceiling
    #[serde(default)]
    pub workers: Option<usize>,

    /// Default report format (text, json)
    #[serde(default)]
    pub format: Option<String>,
}

/// Load project configuration from the analysed root
///
/// Looks for config files in order:
/// 1. `depmap.toml`
/// 2. `.depmap.json`
/// 3. `.depmap.yaml` / `.depmap.yml`
///
/// A file that fails to load is logged and skipped. Returns the default
/// config when nothing loads.
pub fn load_project_config(repo_path: &Path) -> ProjectConfig {
    // Try TOML first (preferred format)
    let toml_path = repo_path.join("depmap.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = repo_path.join(".depmap.json");
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    for yaml_name in &[".depmap.yaml", ".depmap.yml"] {
        let yaml_path = repo_path.join(yaml_name);
        if !yaml_path.exists() {
            continue;
        }
        match load_yaml_config(&yaml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", yaml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", yaml_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_toml_config(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

fn load_json_config(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}

fn load_yaml_config(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub language: Option<String>,
    pub exclude_dirs: Vec<String>,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
    pub workers: Option<usize>,
    pub format: Option<OutputFormat>,
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub root: PathBuf,
    pub language: String,
    pub excluded_dirs: Vec<String>,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
    pub workers: usize,
    pub format: OutputFormat,
}

impl AnalysisSettings {
    /// CLI beats project config beats built-in default
    pub fn resolve(root: PathBuf, cli: CliOverrides, config: ProjectConfig) -> Result<Self> {
        let verbose = cli.verbose || config.verbose;

        let workers = cli.workers.or(config.workers).unwrap_or(DEFAULT_MAX_CONCURRENCY);
        if !(1..=MAX_WORKERS).contains(&workers) {
            bail!("workers must be between 1 and {}, got {}", MAX_WORKERS, workers);
        }

        let format = match (cli.format, config.format.as_deref()) {
            (Some(format), _) => format,
            (None, Some(raw)) => OutputFormat::from_str(raw)
                .with_context(|| format!("Invalid format in project config: '{}'", raw))?,
            (None, None) => OutputFormat::default(),
        };

        let output_file = cli.output_file.or(config.output_file).or_else(|| {
            verbose.then(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
        });

        let excluded_dirs =
            merge_excluded_dirs(config.exclude_dirs.iter().chain(cli.exclude_dirs.iter()));

        Ok(Self {
            root,
            language: cli
                .language
                .or(config.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            excluded_dirs,
            output_file,
            verbose,
            workers,
            format,
        })
    }
}
