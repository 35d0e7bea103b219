use crate::models::{Declaration, DeclarationKind, UsageKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Stable string key of a node: `kind:fullName:line`
pub type NodeId = String;

pub fn node_id(kind: DeclarationKind, full_name: &str, line: u32) -> NodeId {
    format!("{}:{}:{}", kind.as_str(), full_name, line)
}

/// Relationship types between nodes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Calls,
    Instantiates,
    Imports,
    StaticAccess,
    MethodAccess,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Calls => "calls",
            EdgeKind::Instantiates => "instantiates",
            EdgeKind::Imports => "imports",
            EdgeKind::StaticAccess => "static_access",
            EdgeKind::MethodAccess => "method_access",
        }
    }
}

impl From<UsageKind> for EdgeKind {
    fn from(kind: UsageKind) -> Self {
        match kind {
            UsageKind::FunctionCall => EdgeKind::Calls,
            UsageKind::Instantiation => EdgeKind::Instantiates,
            UsageKind::StaticCall => EdgeKind::StaticAccess,
            UsageKind::MethodCall => EdgeKind::MethodAccess,
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declaration in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub id: NodeId,
    pub name: String,
    pub kind: DeclarationKind,
    pub file: String,
    pub namespace: String,
    pub class_name: String,
    pub line: u32,
    pub score: u32,
}

impl DependencyNode {
    pub fn from_declaration(decl: &Declaration, file: &str, score: u32) -> Self {
        Self {
            id: node_id(decl.kind, &decl.full_name(), decl.line),
            name: decl.name.clone(),
            kind: decl.kind,
            file: file.to_string(),
            namespace: decl.namespace.clone(),
            class_name: decl.owning_class.clone().unwrap_or_default(),
            line: decl.line,
            score,
        }
    }
}

/// Weight of one directed edge, shared by both of its endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub kind: EdgeKind,
    pub count: u32,
    pub lines: Vec<u32>,
    /// Raw reference text of the occurrence that created the edge
    pub context: String,
}

/// Key of an edge inside a node's `dependencies`/`dependents` map
pub fn edge_key(peer: &str, kind: EdgeKind) -> String {
    format!("{}#{}", peer, kind.as_str())
}

// ==================== Serialized form ====================

/// One side of an edge as seen from a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSnapshot {
    pub target_id: NodeId,
    pub target_name: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub count: u32,
    pub lines: Vec<u32>,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeclarationKind,
    pub file: String,
    pub namespace: String,
    pub class_name: String,
    pub line: u32,
    pub dependencies: BTreeMap<String, EdgeSnapshot>,
    pub dependents: BTreeMap<String, EdgeSnapshot>,
    pub score: u32,
}

impl NodeSnapshot {
    /// Human-readable name: `Class::member`, `namespace\name` or `name`
    pub fn display_name(&self) -> String {
        match self.kind {
            DeclarationKind::Method if !self.class_name.is_empty() => {
                format!("{}::{}()", self.class_name, self.name)
            }
            DeclarationKind::Property if !self.class_name.is_empty() => {
                format!("{}::${}", self.class_name, self.name)
            }
            DeclarationKind::Constant if !self.class_name.is_empty() => {
                format!("{}::{}", self.class_name, self.name)
            }
            DeclarationKind::Function => format!("{}()", self.name),
            _ if !self.namespace.is_empty() => format!("{}\\{}", self.namespace, self.name),
            _ => self.name.clone(),
        }
    }

    /// Distinct nodes this one references, regardless of edge kind
    pub fn dependency_count(&self) -> usize {
        distinct_peers(&self.dependencies)
    }

    /// Distinct nodes that reference this one, regardless of edge kind
    pub fn dependent_count(&self) -> usize {
        distinct_peers(&self.dependents)
    }
}

fn distinct_peers(edges: &BTreeMap<String, EdgeSnapshot>) -> usize {
    edges
        .values()
        .map(|e| e.target_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// The whole graph, ready for export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<NodeId, NodeSnapshot>,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub orphans: Vec<NodeSnapshot>,
    #[serde(rename = "highlyDepended")]
    pub most_depended: Vec<NodeSnapshot>,
    #[serde(rename = "complexNodes")]
    pub most_complex: Vec<NodeSnapshot>,
}
