//! Ranked views over a finished graph
//!
//! - orphans: no dependencies and no dependents, sorted by node id
//! - most depended: by dependent count, only nodes that have dependents
//! - most complex: by final score
//!
//! Ties are broken by node id so the output never depends on map order.

use super::store_models::NodeId;
use std::cmp::Reverse;

/// How many entries the ranked views keep
pub const RANKING_LIMIT: usize = 10;

/// Connectivity of one node, the input to every view
#[derive(Debug, Clone, Copy)]
pub struct NodeMetrics<'a> {
    pub id: &'a str,
    pub dependencies: usize,
    pub dependents: usize,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphAnalytics {
    pub orphans: Vec<NodeId>,
    pub most_depended: Vec<NodeId>,
    pub most_complex: Vec<NodeId>,
}

pub fn analyze(metrics: &[NodeMetrics<'_>], limit: usize) -> GraphAnalytics {
    let mut orphans: Vec<NodeId> = metrics
        .iter()
        .filter(|m| m.dependencies == 0 && m.dependents == 0)
        .map(|m| m.id.to_string())
        .collect();
    orphans.sort();

    let mut depended: Vec<&NodeMetrics<'_>> = metrics.iter().filter(|m| m.dependents > 0).collect();
    depended.sort_by_key(|m| (Reverse(m.dependents), m.id));

    let mut complex: Vec<&NodeMetrics<'_>> = metrics.iter().collect();
    complex.sort_by_key(|m| (Reverse(m.score), m.id));

    GraphAnalytics {
        orphans,
        most_depended: depended.iter().take(limit).map(|m| m.id.to_string()).collect(),
        most_complex: complex.iter().take(limit).map(|m| m.id.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: &str, dependencies: usize, dependents: usize, score: u32) -> NodeMetrics<'_> {
        NodeMetrics {
            id,
            dependencies,
            dependents,
            score,
        }
    }

    #[test]
    fn test_orphans_sorted_by_id() {
        let metrics = [m("class:B:1", 0, 0, 5), m("class:A:1", 0, 0, 5), m("class:C:1", 1, 0, 6)];
        let result = analyze(&metrics, RANKING_LIMIT);
        assert_eq!(result.orphans, vec!["class:A:1", "class:B:1"]);
    }

    #[test]
    fn test_ties_break_on_id() {
        let metrics = [
            m("function:z:1", 0, 2, 9),
            m("function:a:1", 0, 2, 9),
            m("function:m:1", 0, 3, 4),
        ];
        let result = analyze(&metrics, RANKING_LIMIT);
        assert_eq!(
            result.most_depended,
            vec!["function:m:1", "function:a:1", "function:z:1"]
        );
        assert_eq!(
            result.most_complex,
            vec!["function:a:1", "function:z:1", "function:m:1"]
        );
    }

    #[test]
    fn test_orphans_never_most_depended() {
        let metrics = [m("class:Lonely:1", 0, 0, 50), m("class:Hub:1", 0, 1, 7)];
        let result = analyze(&metrics, RANKING_LIMIT);
        assert_eq!(result.most_depended, vec!["class:Hub:1"]);
        // Orphan status is about edges, score can still rank it
        assert_eq!(result.most_complex[0], "class:Lonely:1");
    }

    #[test]
    fn test_limit_applies() {
        let ids: Vec<String> = (0..15).map(|i| format!("function:f{:02}:1", i)).collect();
        let metrics: Vec<NodeMetrics<'_>> = ids.iter().map(|id| m(id, 1, 1, 3)).collect();
        let result = analyze(&metrics, RANKING_LIMIT);
        assert_eq!(result.most_depended.len(), 10);
        assert_eq!(result.most_complex.len(), 10);
        assert_eq!(result.most_complex[0], "function:f00:1");
        assert!(result.orphans.is_empty());
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(analyze(&[], RANKING_LIMIT), GraphAnalytics::default());
    }
}
