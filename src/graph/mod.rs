//! Dependency graph between declarations
//!
//! petgraph arena plus a symbol index and a three-pass resolver.

pub mod analytics;
pub mod index;
pub mod resolver;
pub mod store;
pub mod store_models;

pub use analytics::{GraphAnalytics, RANKING_LIMIT};
pub use index::SymbolIndex;
pub use resolver::{build_dependency_graph, DependencyResolver, ResolveStats};
pub use store::{DependencyGraph, EdgeOutcome};
pub use store_models::{
    DependencyEdge, DependencyNode, EdgeKind, EdgeSnapshot, GraphSnapshot, NodeId, NodeSnapshot,
};
