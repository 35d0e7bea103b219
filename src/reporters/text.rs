//! Text (terminal) reporter with colors and formatting

use super::AnalysisReport;
use crate::graph::{GraphSnapshot, NodeSnapshot};
use crate::models::{DeclarationKind, UsageKind};
use anyhow::Result;
use std::collections::BTreeMap;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";

const SUMMARY_DEPENDED: usize = 5;
const SUMMARY_DEPENDENTS: usize = 3;
const SUMMARY_COMPLEX: usize = 5;
const SUMMARY_ORPHANS: usize = 10;

/// Render the console summary; `verbose` lifts every truncation
pub fn render(report: &AnalysisReport<'_>, verbose: bool) -> Result<String> {
    let graph = report.graph;
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}DEPENDENCY ANALYSIS SUMMARY{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Files: {}  Elements: {}  Nodes: {}  Dependencies: {}  Orphans: {}  Time: {:.2?}\n",
        report.total_files,
        report.total_elements,
        graph.total_nodes,
        graph.total_edges,
        graph.orphans.len(),
        report.processing_time
    ));

    render_most_depended(&mut out, graph, verbose);
    render_most_complex(&mut out, graph, verbose);
    render_orphans(&mut out, graph, verbose);

    if verbose {
        render_function_usage(&mut out, report);
    } else {
        out.push_str(&format!(
            "\n{DIM}Use -v for complete lists and the function usage report{RESET}\n"
        ));
    }

    Ok(out)
}

fn render_most_depended(out: &mut String, graph: &GraphSnapshot, verbose: bool) {
    out.push_str(&format!("\n{BOLD}MOST DEPENDED UPON{RESET}\n"));
    if graph.most_depended.is_empty() {
        out.push_str(&format!("  {DIM}(none){RESET}\n"));
        return;
    }

    let shown = limit(graph.most_depended.len(), SUMMARY_DEPENDED, verbose);
    for (i, node) in graph.most_depended.iter().take(shown).enumerate() {
        out.push_str(&format!(
            "  {:>2}. {CYAN}{}{RESET} ({}) - {} dependents\n",
            i + 1,
            node.display_name(),
            node.kind,
            node.dependent_count()
        ));

        let peers = limit(node.dependents.len(), SUMMARY_DEPENDENTS, verbose);
        for edge in node.dependents.values().take(peers) {
            out.push_str(&format!(
                "      {DIM}←{RESET} {} ({}, {}x)\n",
                edge.target_name, edge.kind, edge.count
            ));
        }
        push_more(out, node.dependents.len() - peers, "      ");
    }
    push_more(out, graph.most_depended.len() - shown, "  ");
}

fn render_most_complex(out: &mut String, graph: &GraphSnapshot, verbose: bool) {
    out.push_str(&format!("\n{BOLD}MOST COMPLEX{RESET}\n"));
    if graph.most_complex.is_empty() {
        out.push_str(&format!("  {DIM}(none){RESET}\n"));
        return;
    }

    let shown = limit(graph.most_complex.len(), SUMMARY_COMPLEX, verbose);
    for (i, node) in graph.most_complex.iter().take(shown).enumerate() {
        out.push_str(&format!(
            "  {:>2}. {CYAN}{}{RESET} ({}) - score {YELLOW}{}{RESET}\n",
            i + 1,
            node.display_name(),
            node.kind,
            node.score
        ));
        out.push_str(&format!(
            "      {DIM}dependencies: {}, dependents: {}{RESET}\n",
            node.dependency_count(),
            node.dependent_count()
        ));
        if verbose {
            for edge in node.dependencies.values() {
                out.push_str(&format!(
                    "      → {} ({}, {}x)\n",
                    edge.target_name, edge.kind, edge.count
                ));
            }
        }
    }
    push_more(out, graph.most_complex.len() - shown, "  ");
}

fn render_orphans(out: &mut String, graph: &GraphSnapshot, verbose: bool) {
    out.push_str(&format!(
        "\n{BOLD}ORPHANED ELEMENTS{RESET} ({} total)\n",
        graph.orphans.len()
    ));
    let shown = limit(graph.orphans.len(), SUMMARY_ORPHANS, verbose);
    for node in graph.orphans.iter().take(shown) {
        out.push_str(&format!("  • {}\n", orphan_line(node)));
    }
    push_more(out, graph.orphans.len() - shown, "  ");
}

fn orphan_line(node: &NodeSnapshot) -> String {
    format!(
        "{} ({}) {DIM}in {}:{}{RESET}",
        node.display_name(),
        node.kind,
        node.file,
        node.line
    )
}

struct CallSite<'a> {
    line: u32,
    context: &'a str,
}

fn render_function_usage(out: &mut String, report: &AnalysisReport<'_>) {
    out.push_str(&format!("\n{BOLD}FUNCTION USAGE REPORT{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));

    // name -> file -> call sites
    let mut calls: BTreeMap<&str, BTreeMap<&str, Vec<CallSite<'_>>>> = BTreeMap::new();
    for file in report.files {
        for usage in file.usages.iter().filter(|u| u.kind == UsageKind::FunctionCall) {
            calls
                .entry(usage.name.as_str())
                .or_default()
                .entry(file.relative_path.as_str())
                .or_default()
                .push(CallSite {
                    line: usage.line,
                    context: &usage.context,
                });
        }
    }

    if calls.is_empty() {
        out.push_str("  No custom function calls detected.\n");
        out.push_str(&format!("  {DIM}(builtin functions are filtered out){RESET}\n"));
        return;
    }

    // First function node per name, in id order
    let mut definitions: BTreeMap<&str, &NodeSnapshot> = BTreeMap::new();
    for node in report.graph.nodes.values() {
        if node.kind == DeclarationKind::Function {
            definitions.entry(node.name.as_str()).or_insert(node);
        }
    }

    let mut ordered: Vec<(&str, usize, &BTreeMap<&str, Vec<CallSite<'_>>>)> = calls
        .iter()
        .map(|(name, by_file)| (*name, by_file.values().map(Vec::len).sum::<usize>(), by_file))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    for (name, total, by_file) in ordered {
        match definitions.get(name) {
            Some(def) => out.push_str(&format!(
                "\n  {CYAN}{}(){RESET} defined in {}:{} - {} calls\n",
                name, def.file, def.line, total
            )),
            None => out.push_str(&format!(
                "\n  {CYAN}{}(){RESET} {DIM}not defined in scanned files{RESET} - {} calls\n",
                name, total
            )),
        }

        for (file, sites) in by_file {
            out.push_str(&format!("    {}\n", file));
            for site in sites {
                if site.context.is_empty() {
                    out.push_str(&format!("      → line {}\n", site.line));
                } else {
                    out.push_str(&format!("      → line {} in {}()\n", site.line, site.context));
                }
            }
        }
    }
}

fn limit(len: usize, cap: usize, verbose: bool) -> usize {
    if verbose {
        len
    } else {
        len.min(cap)
    }
}

fn push_more(out: &mut String, remaining: usize, indent: &str) {
    if remaining > 0 {
        out.push_str(&format!("{indent}{DIM}... and {} more{RESET}\n", remaining));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{test_files, test_snapshot};
    use std::time::Duration;

    fn render_test(verbose: bool) -> String {
        let files = test_files();
        let snapshot = test_snapshot(&files);
        let report = AnalysisReport {
            graph: &snapshot,
            files: &files,
            total_files: files.len(),
            total_elements: 4,
            processing_time: Duration::from_millis(5),
        };
        render(&report, verbose).unwrap()
    }

    #[test]
    fn test_summary_sections() {
        let out = render_test(false);
        assert!(out.contains("DEPENDENCY ANALYSIS SUMMARY"));
        assert!(out.contains("Files: 2"));
        assert!(out.contains("MOST DEPENDED UPON"));
        assert!(out.contains("(function) - 1 dependents"));
        assert!(out.contains("show (calls, 1x)"));
        assert!(out.contains("MOST COMPLEX"));
        assert!(out.contains("ORPHANED ELEMENTS"));
        assert!(out.contains("App\\Unused (class)"));
        assert!(out.contains("Use -v"));
        assert!(!out.contains("FUNCTION USAGE REPORT"));
    }

    #[test]
    fn test_verbose_function_usage_report() {
        let out = render_test(true);
        assert!(out.contains("FUNCTION USAGE REPORT"));
        assert!(out.contains("format_phone()\x1b[0m defined in helpers.php:2 - 1 calls"));
        assert!(out.contains("legacy_helper()"));
        assert!(out.contains("not defined in scanned files"));
        assert!(out.contains("→ line 5 in show()"));
        assert!(!out.contains("Use -v"));
    }

    #[test]
    fn test_orphan_truncation() {
        let node = |i: usize| NodeSnapshot {
            id: format!("constant:C{:02}:{}", i, i),
            name: format!("C{:02}", i),
            kind: DeclarationKind::Constant,
            file: "consts.php".to_string(),
            namespace: String::new(),
            class_name: String::new(),
            line: i as u32,
            dependencies: BTreeMap::new(),
            dependents: BTreeMap::new(),
            score: 1,
        };
        let snapshot = GraphSnapshot {
            orphans: (0..14).map(node).collect(),
            total_nodes: 14,
            ..Default::default()
        };
        let report = AnalysisReport {
            graph: &snapshot,
            files: &[],
            total_files: 1,
            total_elements: 14,
            processing_time: Duration::ZERO,
        };

        let out = render(&report, false).unwrap();
        assert!(out.contains("(14 total)"));
        assert!(out.contains("... and 4 more"));
        assert!(!out.contains("C13 (constant)"));

        let out = render(&report, true).unwrap();
        assert!(out.contains("C13 (constant)"));
        assert!(out.contains("No custom function calls detected."));
    }
}
