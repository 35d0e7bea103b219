//! Source extraction for supported dialects
//!
//! Each dialect is a [`LanguageParser`] that supplies a [`PatternRules`]
//! table; the shared line scanner in [`extractor`] does the work. Dialects
//! are collected in a [`ParserRegistry`] built once at startup and passed
//! down explicitly.

pub mod extractor;
pub mod php;
pub mod pipeline;
pub mod rules;

use crate::models::{FileInfo, ParsedFile};
use rules::PatternRules;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use php::PhpParser;
pub use pipeline::{extract_files, ExtractionStats, DEFAULT_MAX_CONCURRENCY};

/// Errors raised while selecting a dialect or reading a source file
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported language '{language}' (supported: {supported})")]
    UnsupportedLanguage { language: String, supported: String },

    #[error("a parser for '{0}' is already registered")]
    DuplicateLanguage(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// A source dialect the extractor can scan
pub trait LanguageParser: Send + Sync {
    /// Lowercase language name used for lookup, e.g. `php`
    fn language(&self) -> &'static str;

    /// Accepted file extensions without the leading dot
    fn extensions(&self) -> &'static [&'static str];

    fn rules(&self) -> &PatternRules;

    fn parse_source(&self, source: &str, path: &Path, relative_path: &str) -> ParsedFile {
        extractor::extract(self.rules(), source, path, relative_path)
    }

    /// Read and scan one file. Invalid UTF-8 is replaced, never rejected.
    fn parse_file(&self, file: &FileInfo) -> ParseResult<ParsedFile> {
        let bytes = std::fs::read(&file.path).map_err(|source| ParseError::Read {
            path: file.path.clone(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes);
        Ok(self.parse_source(&source, &file.path, &file.relative_path))
    }
}

/// Explicit map of language name to dialect
#[derive(Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, Box<dyn LanguageParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in dialect
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.parsers.insert("php".to_string(), Box::new(PhpParser::new()));
        registry
    }

    pub fn register(&mut self, parser: Box<dyn LanguageParser>) -> ParseResult<()> {
        let name = parser.language().to_lowercase();
        if self.parsers.contains_key(&name) {
            return Err(ParseError::DuplicateLanguage(name));
        }
        self.parsers.insert(name, parser);
        Ok(())
    }

    pub fn get(&self, language: &str) -> ParseResult<&dyn LanguageParser> {
        self.parsers
            .get(&language.trim().to_lowercase())
            .map(|p| p.as_ref())
            .ok_or_else(|| ParseError::UnsupportedLanguage {
                language: language.to_string(),
                supported: self.languages().join(", "),
            })
    }

    /// Registered language names, sorted
    pub fn languages(&self) -> Vec<&str> {
        self.parsers.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let registry = ParserRegistry::with_defaults();
        assert_eq!(registry.languages(), vec!["php"]);
        assert_eq!(registry.get("PHP").unwrap().language(), "php");
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ParserRegistry::with_defaults();
        let err = registry.register(Box::new(PhpParser::new())).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateLanguage(ref l) if l == "php"));
    }

    #[test]
    fn test_unsupported_language_lists_supported() {
        let registry = ParserRegistry::with_defaults();
        let err = registry.get("cobol").err().unwrap();
        assert_eq!(
            err.to_string(),
            "unsupported language 'cobol' (supported: php)"
        );
    }

    #[test]
    fn test_parse_file_reports_missing_file() {
        let file = FileInfo::new("/definitely/not/here.php", "here.php", 0);
        let err = PhpParser::new().parse_file(&file).unwrap_err();
        assert!(matches!(err, ParseError::Read { .. }));
    }

    #[test]
    fn test_parse_file_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("latin1.php");
        let mut bytes = b"<?php\nfunction caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"_ok() {}\nfunction plain() {}\n");
        std::fs::write(&path, bytes).expect("write fixture");

        let parsed = PhpParser::new()
            .parse_file(&FileInfo::new(&path, "latin1.php", 0))
            .expect("parse");
        assert!(parsed.declarations.iter().any(|d| d.name == "plain"));
    }
}
