//! Line scanner that turns source text into a [`ParsedFile`]
//!
//! This is a finite-state approximation of a parser, not a grammar. It keeps
//! three pieces of state while walking the file line by line:
//!
//! - the enclosing class name
//! - the enclosing function or method name
//! - the brace depth, counted per line
//!
//! Both names are cleared whenever the depth returns to zero. A signature
//! line that opens no brace leaves the depth at zero without clearing, so
//! bodies that open on the next line keep their context. Every
//! non-comment line is offered to every rule in [`PatternRules`], so several
//! declarations and usages may come from the same line. Lines that match
//! nothing are inert.

use super::rules::PatternRules;
use crate::models::{
    Declaration, DeclarationKind, Import, ParsedFile, Usage, UsageKind, Visibility,
};
use regex::Captures;
use std::path::Path;

#[derive(Debug, Default)]
struct ScanState {
    class: Option<String>,
    function: Option<String>,
    depth: i64,
}

impl ScanState {
    fn context(&self) -> String {
        self.function
            .as_deref()
            .or(self.class.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// Extract declarations and usages from one file's text
pub fn extract(rules: &PatternRules, source: &str, path: &Path, relative_path: &str) -> ParsedFile {
    let mut parsed = ParsedFile::new(path, relative_path);
    let mut state = ScanState::default();

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || rules.is_comment(trimmed) {
            continue;
        }

        let opened = line.matches('{').count() as i64;
        let closed = line.matches('}').count() as i64;
        let before = state.depth;
        state.depth += opened - closed;

        scan_declarations(rules, line, line_no, &mut state, &mut parsed);
        scan_usages(rules, line, line_no, &state.context(), &mut parsed.usages);

        // A signature whose body opens on a later line stays pending at depth 0
        let returned = before > 0 || opened > 0;
        if state.depth < 0 || (state.depth == 0 && returned) {
            state.depth = 0;
            state.class = None;
            state.function = None;
        }
    }

    parsed
}

fn scan_declarations(
    rules: &PatternRules,
    line: &str,
    line_no: u32,
    state: &mut ScanState,
    parsed: &mut ParsedFile,
) {
    if parsed.namespace.is_empty() {
        if let Some(caps) = rules.namespace.captures(line) {
            parsed.namespace = group(&caps, "name").to_string();
        }
    }

    if let Some(caps) = rules.import.captures(line) {
        let path = group(&caps, "path").trim_start_matches('\\');
        if !path.is_empty() {
            parsed.imports.push(Import {
                path: path.to_string(),
                alias: optional_group(&caps, "alias"),
                line: line_no,
            });
        }
    }

    if let Some(caps) = rules.class.captures(line) {
        let name = group(&caps, "name");
        let mut decl = Declaration::new(DeclarationKind::Class, name, &parsed.namespace, line_no);
        decl.is_abstract = has_word(group(&caps, "modifiers"), "abstract");
        parsed.declarations.push(decl);
        state.class = Some(name.to_string());
    }

    if let Some(class) = state.class.clone() {
        if let Some(caps) = rules.method.captures(line) {
            let modifiers = group(&caps, "modifiers");
            let name = group(&caps, "name");
            let mut decl =
                Declaration::new(DeclarationKind::Method, name, &parsed.namespace, line_no);
            decl.owning_class = Some(class.clone());
            decl.visibility = Some(visibility_from_modifiers(modifiers));
            decl.is_static = has_word(modifiers, "static");
            decl.is_abstract = has_word(modifiers, "abstract");
            decl.parameters = rules.parse_parameters(group(&caps, "params"));
            decl.return_type = optional_group(&caps, "ret");
            parsed.declarations.push(decl);
            state.function = Some(name.to_string());
        }

        if let Some(caps) = rules.property.captures(line) {
            let mut decl = Declaration::new(
                DeclarationKind::Property,
                group(&caps, "name"),
                &parsed.namespace,
                line_no,
            );
            decl.owning_class = Some(class);
            decl.visibility = Some(
                Visibility::from_keyword(group(&caps, "visibility")).unwrap_or_default(),
            );
            decl.is_static = has_word(group(&caps, "modifiers"), "static");
            parsed.declarations.push(decl);
        }
    } else if let Some(caps) = rules.function.captures(line) {
        let name = group(&caps, "name");
        let mut decl = Declaration::new(DeclarationKind::Function, name, &parsed.namespace, line_no);
        decl.parameters = rules.parse_parameters(group(&caps, "params"));
        decl.return_type = optional_group(&caps, "ret");
        parsed.declarations.push(decl);
        state.function = Some(name.to_string());
    }

    if let Some(caps) = rules.constant.captures(line) {
        let mut decl = Declaration::new(
            DeclarationKind::Constant,
            group(&caps, "name"),
            &parsed.namespace,
            line_no,
        );
        decl.owning_class = state.class.clone();
        decl.visibility = Some(
            Visibility::from_keyword(group(&caps, "visibility")).unwrap_or_default(),
        );
        parsed.declarations.push(decl);
    }
}

fn scan_usages(rules: &PatternRules, line: &str, line_no: u32, context: &str, usages: &mut Vec<Usage>) {
    let mut push = |kind: UsageKind, name: String| {
        usages.push(Usage {
            kind,
            name,
            context: context.to_string(),
            line: line_no,
        });
    };

    for caps in rules.static_call.captures_iter(line) {
        push(
            UsageKind::StaticCall,
            format!("{}::{}", group(&caps, "class"), group(&caps, "member")),
        );
    }

    for caps in rules.member_call.captures_iter(line) {
        push(UsageKind::MethodCall, group(&caps, "member").to_string());
    }

    for caps in rules.instantiation.captures_iter(line) {
        push(UsageKind::Instantiation, group(&caps, "class").to_string());
    }

    if rules.member_operators.iter().any(|op| line.contains(op)) {
        return;
    }

    for caps in rules.function_call.captures_iter(line) {
        let Some(m) = caps.name("name") else {
            continue;
        };
        let name = m.as_str();
        if rules.is_builtin(name) || rules.closure_keywords.contains(&name) {
            continue;
        }
        if rules
            .declaration_keywords
            .iter()
            .any(|kw| line.contains(&format!("{} {}", kw, name)))
        {
            continue;
        }
        if preceded_by_keyword(line, m.start(), rules.instantiation_keyword) {
            continue;
        }
        push(UsageKind::FunctionCall, name.to_string());
    }
}

/// Whether the (possibly qualified) name at `start` follows `keyword`
fn preceded_by_keyword(line: &str, start: usize, keyword: &str) -> bool {
    let before =
        line[..start].trim_end_matches(|c: char| c.is_alphanumeric() || c == '_' || c == '\\');
    let spaced = before.trim_end();
    if spaced.len() == before.len() || !spaced.ends_with(keyword) {
        return false;
    }
    spaced[..spaced.len() - keyword.len()]
        .chars()
        .next_back()
        .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '$'))
}

fn visibility_from_modifiers(modifiers: &str) -> Visibility {
    modifiers
        .split_whitespace()
        .find_map(Visibility::from_keyword)
        .unwrap_or_default()
}

fn has_word(text: &str, word: &str) -> bool {
    text.split_whitespace().any(|w| w == word)
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map(|m| m.as_str()).unwrap_or("")
}

fn optional_group(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
