//! Core data models for depmap
//!
//! These models flow from file discovery through extraction into the
//! dependency resolver. Everything here is produced once and then only read.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A source file selected for analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    /// Path relative to the analysed root, always `/`-separated
    pub relative_path: String,
    pub size: u64,
}

impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
            size,
        }
    }
}

/// Kind of a declared program element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Function,
    Method,
    Property,
    Constant,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Function => "function",
            DeclarationKind::Method => "method",
            DeclarationKind::Property => "property",
            DeclarationKind::Constant => "constant",
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    /// Parse a visibility keyword; `var` is the legacy spelling of public
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim() {
            "public" | "var" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            _ => None,
        }
    }
}

/// A named element declared in source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    /// Empty for the global namespace
    pub namespace: String,
    /// Set for methods, properties and class constants
    pub owning_class: Option<String>,
    /// Only members carry a visibility
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub line: u32,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, name: &str, namespace: &str, line: u32) -> Self {
        Self {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
            owning_class: None,
            visibility: None,
            is_static: false,
            is_abstract: false,
            line,
            parameters: Vec::new(),
            return_type: None,
        }
    }

    /// `namespace\name`, or the bare name in the global namespace
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

/// Join a namespace and a short name with the namespace separator
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", namespace, name)
    }
}

/// Kind of a usage site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    Instantiation,
    MethodCall,
    StaticCall,
    FunctionCall,
}

impl UsageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageKind::Instantiation => "instantiation",
            UsageKind::MethodCall => "method_call",
            UsageKind::StaticCall => "static_call",
            UsageKind::FunctionCall => "function_call",
        }
    }
}

/// One textual reference to another element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub kind: UsageKind,
    /// Raw name; `Class::member` for static calls
    pub name: String,
    /// Enclosing function/method, else enclosing class, else empty
    pub context: String,
    pub line: u32,
}

/// An import (`use`) statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    pub alias: Option<String>,
    pub line: u32,
}

/// Everything extracted from one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub namespace: String,
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
    pub usages: Vec<Usage>,
}

impl ParsedFile {
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let global = Declaration::new(DeclarationKind::Function, "format_phone", "", 3);
        assert_eq!(global.full_name(), "format_phone");

        let scoped = Declaration::new(DeclarationKind::Class, "User", "App\\Models", 7);
        assert_eq!(scoped.full_name(), "App\\Models\\User");
    }

    #[test]
    fn test_visibility_keywords() {
        assert_eq!(Visibility::from_keyword("var"), Some(Visibility::Public));
        assert_eq!(
            Visibility::from_keyword(" protected "),
            Some(Visibility::Protected)
        );
        assert_eq!(Visibility::from_keyword("static"), None);
    }
}
