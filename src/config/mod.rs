//! Configuration for depmap
//!
//! - Project-level configuration (`depmap.toml` and friends)
//! - Merging CLI flags over the project file over built-in defaults

mod project_config;

pub use project_config::{
    load_project_config, AnalysisSettings, CliOverrides, ProjectConfig, DEFAULT_LANGUAGE,
    DEFAULT_OUTPUT_FILE, MAX_WORKERS,
};
