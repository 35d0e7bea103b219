//! Pattern rule tables for the line scanner
//!
//! A dialect is described entirely by data: a set of compiled regexes with
//! agreed named capture groups, the prefixes that mark comment lines, the
//! parameter sigil, and the builtin names that must never be reported as
//! function calls. The scanner in `extractor` knows nothing else about the
//! language.
//!
//! # Capture groups
//!
//! | rule            | groups                                     |
//! |-----------------|--------------------------------------------|
//! | `namespace`     | `name`                                     |
//! | `import`        | `path`, `alias`?                           |
//! | `class`         | `modifiers`?, `name`                       |
//! | `method`        | `modifiers`?, `name`, `params`?, `ret`?    |
//! | `function`      | `name`, `params`?, `ret`?                  |
//! | `property`      | `visibility`, `modifiers`?, `name`         |
//! | `constant`      | `visibility`?, `name`                      |
//! | `static_call`   | `class`, `member`                          |
//! | `member_call`   | `member`                                   |
//! | `instantiation` | `class`                                    |
//! | `function_call` | `name`                                     |

use regex::Regex;
use rustc_hash::FxHashSet;

pub struct PatternRules {
    pub namespace: Regex,
    pub import: Regex,
    pub class: Regex,
    pub method: Regex,
    pub function: Regex,
    pub property: Regex,
    pub constant: Regex,
    pub static_call: Regex,
    pub member_call: Regex,
    pub instantiation: Regex,
    pub function_call: Regex,
    /// Trimmed lines starting with any of these are skipped
    pub comment_prefixes: &'static [&'static str],
    /// Character that introduces a parameter name (`$` in PHP)
    pub param_sigil: char,
    /// Member access operators; a line containing one suppresses function calls
    pub member_operators: &'static [&'static str],
    /// Keyword that introduces an instantiation, never itself a call
    pub instantiation_keyword: &'static str,
    /// Keywords that open an anonymous function, e.g. `function (`
    pub closure_keywords: &'static [&'static str],
    /// Keywords that introduce a named declaration on a signature line
    pub declaration_keywords: &'static [&'static str],
    builtins: FxHashSet<&'static str>,
}

/// Regex sources for one dialect, compiled by [`PatternRules::compile`]
pub struct RuleSource {
    pub namespace: &'static str,
    pub import: &'static str,
    pub class: &'static str,
    pub method: &'static str,
    pub function: &'static str,
    pub property: &'static str,
    pub constant: &'static str,
    pub static_call: &'static str,
    pub member_call: &'static str,
    pub instantiation: &'static str,
    pub function_call: &'static str,
    pub comment_prefixes: &'static [&'static str],
    pub param_sigil: char,
    pub member_operators: &'static [&'static str],
    pub instantiation_keyword: &'static str,
    pub closure_keywords: &'static [&'static str],
    pub declaration_keywords: &'static [&'static str],
    pub builtins: &'static [&'static str],
}

impl PatternRules {
    pub fn compile(source: &RuleSource) -> Result<Self, regex::Error> {
        Ok(Self {
            namespace: Regex::new(source.namespace)?,
            import: Regex::new(source.import)?,
            class: Regex::new(source.class)?,
            method: Regex::new(source.method)?,
            function: Regex::new(source.function)?,
            property: Regex::new(source.property)?,
            constant: Regex::new(source.constant)?,
            static_call: Regex::new(source.static_call)?,
            member_call: Regex::new(source.member_call)?,
            instantiation: Regex::new(source.instantiation)?,
            function_call: Regex::new(source.function_call)?,
            comment_prefixes: source.comment_prefixes,
            param_sigil: source.param_sigil,
            member_operators: source.member_operators,
            instantiation_keyword: source.instantiation_keyword,
            closure_keywords: source.closure_keywords,
            declaration_keywords: source.declaration_keywords,
            builtins: source.builtins.iter().copied().collect(),
        })
    }

    /// Case-insensitive lookup in the builtin table
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name.to_lowercase().as_str())
    }

    pub fn is_comment(&self, trimmed: &str) -> bool {
        self.comment_prefixes.iter().any(|p| trimmed.starts_with(p))
    }

    /// Split a raw parameter list into bare parameter names.
    ///
    /// Fragments without the sigil (type-only or variadic-only tokens) are
    /// dropped and default values are cut off.
    pub fn parse_parameters(&self, raw: &str) -> Vec<String> {
        raw.split(',')
            .filter_map(|fragment| {
                let (_, after) = fragment.trim().split_once(self.param_sigil)?;
                let name = after.split('=').next().unwrap_or("").trim();
                Some(name.to_string())
            })
            .collect()
    }
}
