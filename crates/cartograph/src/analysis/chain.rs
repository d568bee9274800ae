//! Shortest import chain between two files, using petgraph.
//!
//! The import subgraph is loaded into a `DiGraph` on demand; the knowledge
//! graph itself stays the source of truth.

use std::collections::HashMap;

use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::{EdgeType, KnowledgeGraph};

/// Shortest path of `IMPORTS` edges from `from` to `to`, both ends included.
///
/// Returns `None` if either file has no import edges or no path exists.
/// A file to itself is the one-element path.
#[must_use]
pub fn dependency_chain(graph: &KnowledgeGraph, from: &str, to: &str) -> Option<Vec<String>> {
    if from == to {
        return graph.contains(from).then(|| vec![from.to_string()]);
    }

    let mut imports: DiGraph<&str, ()> = DiGraph::new();
    let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();
    for edge in graph
        .edges()
        .iter()
        .filter(|edge| edge.edge_type == EdgeType::Imports)
    {
        let source = *node_map
            .entry(edge.from.as_str())
            .or_insert_with(|| imports.add_node(edge.from.as_str()));
        let target = *node_map
            .entry(edge.to.as_str())
            .or_insert_with(|| imports.add_node(edge.to.as_str()));
        imports.update_edge(source, target, ());
    }

    let start = *node_map.get(from)?;
    let goal = *node_map.get(to)?;

    let (_, path) = algo::astar(&imports, start, |n| n == goal, |_| 1usize, |_| 0)?;
    Some(path.into_iter().map(|n| imports[n].to_string()).collect())
}
