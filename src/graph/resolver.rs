//! Three-pass dependency resolution
//!
//! 1. Register every declaration as a node and index its names.
//! 2. Resolve every usage and import against the complete index and record
//!    edges.
//! 3. Fold connectivity into scores and compute the ranked views.
//!
//! Pass 2 cannot start early: a usage in one file may target a declaration
//! in a file that has not been visited yet.

use super::analytics::RANKING_LIMIT;
use super::index::SymbolIndex;
use super::store::{DependencyGraph, EdgeOutcome};
use super::store_models::{node_id, DependencyNode, EdgeKind, NodeId};
use crate::models::{qualify, DeclarationKind, ParsedFile, Usage};
use crate::scoring;
use tracing::{debug, info};

/// Counters describing one resolution run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolveStats {
    pub declarations: usize,
    pub usages: usize,
    /// Usages outside any declaration (top-level script code)
    pub without_source: usize,
    /// Usages whose target is not declared in the scanned tree
    pub external: usize,
    pub self_references: usize,
    pub resolved: usize,
    pub imports: usize,
    pub unresolved_imports: usize,
}

pub struct DependencyResolver {
    graph: DependencyGraph,
    index: SymbolIndex,
    stats: ResolveStats,
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self {
            graph: DependencyGraph::new(),
            index: SymbolIndex::new(),
            stats: ResolveStats::default(),
        }
    }

    /// Pass 1: create nodes with their static score and fill the index
    pub fn register_declarations<'a>(&mut self, files: impl IntoIterator<Item = &'a ParsedFile>) {
        let mut nodes = Vec::new();
        for file in files {
            for decl in &file.declarations {
                let node = DependencyNode::from_declaration(
                    decl,
                    &file.relative_path,
                    scoring::static_score(decl),
                );
                self.index.insert(decl, &node.id);
                nodes.push(node);
            }
        }
        self.stats.declarations += nodes.len();
        let added = self.graph.add_nodes_batch(nodes);
        debug!("Registered {} nodes ({} names indexed)", added, self.index.len());
    }

    /// Pass 2: turn usages and imports into edges
    pub fn link_references<'a>(&mut self, files: impl IntoIterator<Item = &'a ParsedFile>) {
        for file in files {
            let declared: Vec<(&str, DeclarationKind, NodeId)> = file
                .declarations
                .iter()
                .map(|d| (d.name.as_str(), d.kind, node_id(d.kind, &d.full_name(), d.line)))
                .collect();

            for usage in &file.usages {
                self.link_usage(usage, &file.namespace, &declared);
            }

            let classes: Vec<&NodeId> = declared
                .iter()
                .filter(|(_, kind, _)| *kind == DeclarationKind::Class)
                .map(|(_, _, id)| id)
                .collect();

            for import in &file.imports {
                self.stats.imports += 1;
                let Some(target) = self.index.by_full_name(&import.path).cloned() else {
                    self.stats.unresolved_imports += 1;
                    continue;
                };
                for class_id in &classes {
                    self.apply(class_id, &target, EdgeKind::Imports, import.line, &import.path);
                }
            }
        }
    }

    fn link_usage(&mut self, usage: &Usage, namespace: &str, declared: &[(&str, DeclarationKind, NodeId)]) {
        self.stats.usages += 1;

        // First declaration in the file carrying the context's name
        let source = (!usage.context.is_empty())
            .then(|| declared.iter().find(|(name, _, _)| *name == usage.context))
            .flatten()
            .map(|(_, _, id)| id);
        let Some(source) = source else {
            self.stats.without_source += 1;
            return;
        };

        let Some(target) = self.resolve_target(&usage.name, namespace) else {
            self.stats.external += 1;
            return;
        };

        self.apply(source, &target, EdgeKind::from(usage.kind), usage.line, &usage.name);
    }

    fn apply(&mut self, source: &str, target: &str, kind: EdgeKind, line: u32, context: &str) {
        match self.graph.add_reference(source, target, kind, line, context) {
            EdgeOutcome::Created | EdgeOutcome::Updated => self.stats.resolved += 1,
            EdgeOutcome::SelfReference => self.stats.self_references += 1,
            EdgeOutcome::UnknownNode => self.stats.external += 1,
        }
    }

    /// Find the node a raw usage name refers to, from inside `namespace`
    pub fn resolve_target(&self, raw: &str, namespace: &str) -> Option<NodeId> {
        let name = raw.trim_start_matches('\\');

        if let Some((class_name, _member)) = name.split_once("::") {
            if let Some(id) = self.index.by_full_name(&qualify(namespace, class_name)) {
                return Some(id.clone());
            }
            if let Some(id) = self
                .index
                .class_full_name(class_name)
                .and_then(|full| self.index.by_full_name(full))
            {
                return Some(id.clone());
            }
            let id = self.index.by_short_name(class_name)?;
            let node = self.graph.node(id)?;
            return (!node.namespace.is_empty() || !node.file.is_empty()).then(|| id.clone());
        }

        self.index
            .by_full_name(name)
            .or_else(|| self.index.by_full_name(&qualify(namespace, name)))
            .or_else(|| {
                self.index
                    .class_full_name(name)
                    .and_then(|full| self.index.by_full_name(full))
            })
            .cloned()
    }

    /// Pass 3: connectivity scoring and ranked views
    pub fn finish(self) -> (DependencyGraph, ResolveStats) {
        self.graph.apply_connectivity_scores();
        let analytics = self.graph.compute_analytics(RANKING_LIMIT);

        info!(
            "Dependency graph: {} nodes, {} edges, {} orphans",
            self.graph.node_count(),
            self.graph.edge_count(),
            analytics.orphans.len()
        );
        debug!("Resolution stats: {:?}", self.stats);

        (self.graph, self.stats)
    }
}

/// Run all three passes over `files`, visiting them in path order
pub fn build_dependency_graph(files: &[ParsedFile]) -> (DependencyGraph, ResolveStats) {
    let mut ordered: Vec<&ParsedFile> = files.iter().collect();
    ordered.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let mut resolver = DependencyResolver::new();
    resolver.register_declarations(ordered.iter().copied());
    resolver.link_references(ordered.iter().copied());
    resolver.finish()
}
