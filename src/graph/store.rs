//! Dependency graph storage on petgraph
//!
//! Nodes live in a petgraph arena addressed by their string id. An edge is a
//! single petgraph edge, so the dependency seen from the source and the
//! dependent seen from the target are the same object and can never drift
//! apart. One `RwLock` guards the arena, the id index and the counters
//! together: node insertion and each edge application happen under a single
//! write guard.

use super::analytics::{self, GraphAnalytics, NodeMetrics};
use super::store_models::{
    edge_key, DependencyEdge, DependencyNode, EdgeKind, EdgeSnapshot, GraphSnapshot, NodeId,
    NodeSnapshot,
};
use crate::scoring;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// What happened when a reference was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Created,
    Updated,
    SelfReference,
    UnknownNode,
}

#[derive(Default)]
struct GraphInner {
    graph: DiGraph<DependencyNode, DependencyEdge>,
    index: FxHashMap<NodeId, NodeIndex>,
    total_edges: usize,
    analytics: GraphAnalytics,
}

impl GraphInner {
    /// Distinct peer nodes in one direction; several edge kinds to the same
    /// peer count once
    fn peer_count(&self, idx: NodeIndex, direction: Direction) -> usize {
        self.graph
            .edges_directed(idx, direction)
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .collect::<FxHashSet<_>>()
            .len()
    }

    fn metrics(&self) -> Vec<NodeMetrics<'_>> {
        self.graph
            .node_indices()
            .map(|idx| NodeMetrics {
                id: &self.graph[idx].id,
                dependencies: self.peer_count(idx, Direction::Outgoing),
                dependents: self.peer_count(idx, Direction::Incoming),
                score: self.graph[idx].score,
            })
            .collect()
    }

    fn snapshot_node(&self, idx: NodeIndex) -> NodeSnapshot {
        let node = &self.graph[idx];

        let dependencies = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| {
                let peer = &self.graph[e.target()];
                (edge_key(&peer.id, e.weight().kind), edge_snapshot(peer, e.weight()))
            })
            .collect();

        let dependents = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| {
                let peer = &self.graph[e.source()];
                (edge_key(&peer.id, e.weight().kind), edge_snapshot(peer, e.weight()))
            })
            .collect();

        NodeSnapshot {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind,
            file: node.file.clone(),
            namespace: node.namespace.clone(),
            class_name: node.class_name.clone(),
            line: node.line,
            dependencies,
            dependents,
            score: node.score,
        }
    }
}

fn edge_snapshot(peer: &DependencyNode, edge: &DependencyEdge) -> EdgeSnapshot {
    EdgeSnapshot {
        target_id: peer.id.clone(),
        target_name: peer.name.clone(),
        kind: edge.kind,
        count: edge.count,
        lines: edge.lines.clone(),
        context: edge.context.clone(),
    }
}

/// Dependency graph shared between the builder and readers
#[derive(Default)]
pub struct DependencyGraph {
    inner: RwLock<GraphInner>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Lock Helpers ====================
    //
    // Poisoning means a writer panicked halfway through an update, so the
    // graph may hold a half-applied edge. Nothing can recover from that.

    fn read(&self) -> RwLockReadGuard<'_, GraphInner> {
        self.inner
            .read()
            .expect("graph lock poisoned: a thread panicked while holding this lock")
    }

    fn write(&self) -> RwLockWriteGuard<'_, GraphInner> {
        self.inner
            .write()
            .expect("graph lock poisoned: a thread panicked while holding this lock")
    }

    /// Insert many nodes under one write guard, returning how many were new
    pub fn add_nodes_batch(&self, nodes: Vec<DependencyNode>) -> usize {
        let mut inner = self.write();
        let mut added = 0;
        for node in nodes {
            if inner.index.contains_key(&node.id) {
                debug!("Node {} already exists, keeping the first declaration", node.id);
                continue;
            }
            let id = node.id.clone();
            let idx = inner.graph.add_node(node);
            inner.index.insert(id, idx);
            added += 1;
        }
        added
    }

    pub fn node(&self, id: &str) -> Option<DependencyNode> {
        let inner = self.read();
        inner.index.get(id).map(|&idx| inner.graph[idx].clone())
    }

    /// Record one reference from `source` to `target`.
    ///
    /// Edges are unique per (source, target, kind): a repeat reference bumps
    /// the count and appends the line, a new one increments `total_edges`.
    pub fn add_reference(
        &self,
        source: &str,
        target: &str,
        kind: EdgeKind,
        line: u32,
        context: &str,
    ) -> EdgeOutcome {
        if source == target {
            return EdgeOutcome::SelfReference;
        }

        let mut inner = self.write();
        let (Some(&from), Some(&to)) = (inner.index.get(source), inner.index.get(target)) else {
            return EdgeOutcome::UnknownNode;
        };

        let existing = inner
            .graph
            .edges_connecting(from, to)
            .find(|e| e.weight().kind == kind)
            .map(|e| e.id());

        if let Some(edge_idx) = existing {
            let edge = &mut inner.graph[edge_idx];
            edge.count += 1;
            edge.lines.push(line);
            return EdgeOutcome::Updated;
        }

        inner.graph.add_edge(
            from,
            to,
            DependencyEdge {
                kind,
                count: 1,
                lines: vec![line],
                context: context.to_string(),
            },
        );
        inner.total_edges += 1;
        EdgeOutcome::Created
    }

    pub fn node_count(&self) -> usize {
        self.read().graph.node_count()
    }

    /// Number of distinct edges created so far
    pub fn edge_count(&self) -> usize {
        self.read().total_edges
    }

    /// Fold fan-out and fan-in into every node's score
    pub fn apply_connectivity_scores(&self) {
        let mut inner = self.write();
        let bonuses: Vec<(NodeIndex, u32)> = inner
            .graph
            .node_indices()
            .map(|idx| {
                let out = inner.peer_count(idx, Direction::Outgoing);
                let inc = inner.peer_count(idx, Direction::Incoming);
                (idx, scoring::connectivity_bonus(out, inc))
            })
            .collect();
        for (idx, bonus) in bonuses {
            inner.graph[idx].score += bonus;
        }
    }

    /// Compute orphans and ranked views; call after scoring
    pub fn compute_analytics(&self, limit: usize) -> GraphAnalytics {
        let mut inner = self.write();
        let result = analytics::analyze(&inner.metrics(), limit);
        inner.analytics = result.clone();
        result
    }

    /// Consistent copy of the whole graph for export and reporting
    pub fn snapshot(&self) -> GraphSnapshot {
        let inner = self.read();

        let nodes: BTreeMap<NodeId, NodeSnapshot> = inner
            .graph
            .node_indices()
            .map(|idx| (inner.graph[idx].id.clone(), inner.snapshot_node(idx)))
            .collect();

        let resolve = |ids: &[NodeId]| -> Vec<NodeSnapshot> {
            ids.iter().filter_map(|id| nodes.get(id).cloned()).collect()
        };

        GraphSnapshot {
            total_nodes: nodes.len(),
            total_edges: inner.total_edges,
            orphans: resolve(&inner.analytics.orphans),
            most_depended: resolve(&inner.analytics.most_depended),
            most_complex: resolve(&inner.analytics.most_complex),
            nodes,
        }
    }
}

#[cfg(test)]
impl DependencyGraph {
    pub(crate) fn add_node(&self, node: DependencyNode) -> bool {
        self.add_nodes_batch(vec![node]) == 1
    }

    pub(crate) fn edge(&self, source: &str, target: &str, kind: EdgeKind) -> Option<DependencyEdge> {
        let inner = self.read();
        let from = *inner.index.get(source)?;
        let to = *inner.index.get(target)?;
        inner
            .graph
            .edges_connecting(from, to)
            .find(|e| e.weight().kind == kind)
            .map(|e| e.weight().clone())
    }

    pub(crate) fn dependency_count(&self, id: &str) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    pub(crate) fn dependent_count(&self, id: &str) -> usize {
        self.degree(id, Direction::Incoming)
    }

    fn degree(&self, id: &str, direction: Direction) -> usize {
        let inner = self.read();
        inner
            .index
            .get(id)
            .map(|&idx| inner.peer_count(idx, direction))
            .unwrap_or(0)
    }

    pub(crate) fn analytics(&self) -> GraphAnalytics {
        self.read().analytics.clone()
    }
}
