//! Source file discovery
//!
//! Walks the analysed root and produces a [`FileInfo`] for every file whose
//! extension belongs to the selected dialect. Excluded directories are pruned
//! by name at any depth below the root. A `.depmapignore` file in any visited
//! directory adds gitignore-style rules.

use crate::models::FileInfo;
use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Directories skipped unless the user overrides the list
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "vendor",
    "node_modules",
    ".git",
    ".svn",
    "storage",
    "cache",
    "tmp",
    "temp",
    ".idea",
    ".vscode",
    "bootstrap",
];

pub const IGNORE_FILENAME: &str = ".depmapignore";

/// Collect source files under `root`, sorted by relative path
pub fn collect_files(root: &Path, extensions: &[&str], excluded_dirs: &[String]) -> Result<Vec<FileInfo>> {
    let meta = std::fs::metadata(root)
        .with_context(|| format!("Cannot access {}", root.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let excluded: HashSet<String> = excluded_dirs.iter().cloned().collect();
    let extensions: Vec<String> = extensions.iter().map(|e| e.to_lowercase()).collect();

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .add_custom_ignore_filename(IGNORE_FILENAME)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !(is_dir && excluded.contains(entry.file_name().to_string_lossy().as_ref()))
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        files.push(FileInfo::new(path, relative_path(root, path), size));
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    debug!("Discovered {} files under {}", files.len(), root.display());
    Ok(files)
}

/// `/`-separated path of `path` below `root`
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Built-in exclusions followed by `extra`, de-duplicated in order
pub fn merge_excluded_dirs<'a>(extra: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    DEFAULT_EXCLUDED_DIRS
        .iter()
        .map(|d| d.to_string())
        .chain(extra.into_iter().cloned())
        .filter(|d| !d.is_empty() && seen.insert(d.clone()))
        .collect()
}
