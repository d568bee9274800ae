//! Blast-radius traversal over the call graph.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::graph::{EdgeType, KnowledgeGraph, NodeType};

use super::lookup::defining_file;

/// Functions and files that transitively depend on a function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlastRadius {
    /// Affected function ids in BFS discovery order, start excluded.
    pub affected_functions: Vec<String>,
    /// Defining files of the affected functions, first-seen order, no duplicates.
    pub affected_files: Vec<String>,
    /// Deepest BFS level reached (0 when nothing is affected).
    pub depth: usize,
}

impl BlastRadius {
    /// Whether nothing depends on the function.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.affected_functions.is_empty()
    }
}

/// Breadth-first walk of the functions that depend on `function_id`.
///
/// `CALLS` edges are stored callee → caller, so following a function's
/// outgoing `CALLS` edges reaches its callers, then their callers, and so on.
/// Each id is visited at most once, which bounds the walk on cyclic call
/// graphs. An id that is not a function node yields an empty result, even if
/// dangling edges mention it.
///
/// Ids reached through dangling edges are reported like any other id, but only
/// known function nodes contribute a defining file.
#[must_use]
pub fn function_blast_radius(graph: &KnowledgeGraph, function_id: &str) -> BlastRadius {
    let mut result = BlastRadius::default();
    if graph
        .get_node(function_id)
        .is_none_or(|node| node.node_type() != NodeType::Function)
    {
        return result;
    }

    let mut visited: HashSet<&str> = HashSet::from([function_id]);
    let mut seen_files: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(function_id, 0)]);

    while let Some((current, level)) = queue.pop_front() {
        for edge in graph.outgoing_of_type(current, EdgeType::Calls) {
            let next = edge.to.as_str();
            if !visited.insert(next) {
                continue;
            }

            let next_level = level + 1;
            result.depth = result.depth.max(next_level);
            result.affected_functions.push(next.to_string());

            if let Some(file) = defining_file(graph, next) {
                if seen_files.insert(file) {
                    result.affected_files.push(file.to_string());
                }
            }

            queue.push_back((next, next_level));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn calls(graph: &mut KnowledgeGraph, from: &str, to: &str) {
        graph.add_edge(Edge::new(from, to, EdgeType::Calls));
    }

    fn functions(graph: &mut KnowledgeGraph, ids: &[&str]) {
        for id in ids {
            graph.add_node(Node::function(*id, *id, "f.ts", 1));
        }
    }

    #[test]
    fn chain_reports_discovery_order_and_depth() {
        let mut graph = KnowledgeGraph::new();
        for (id, file) in [("A", "a.ts"), ("B", "b.ts"), ("C", "c.ts")] {
            graph.add_node(Node::function(id, id, file, 1));
        }
        calls(&mut graph, "A", "B");
        calls(&mut graph, "B", "C");

        let radius = function_blast_radius(&graph, "A");

        assert_eq!(radius.affected_functions, ["B", "C"]);
        assert_eq!(radius.affected_files, ["b.ts", "c.ts"]);
        assert_eq!(radius.depth, 2);
    }

    #[test]
    fn cycle_terminates_and_excludes_start() {
        let mut graph = KnowledgeGraph::new();
        functions(&mut graph, &["A", "B", "C"]);
        calls(&mut graph, "A", "B");
        calls(&mut graph, "B", "C");
        calls(&mut graph, "C", "A");
        calls(&mut graph, "C", "B");

        let radius = function_blast_radius(&graph, "A");

        assert_eq!(radius.affected_functions, ["B", "C"]);
        assert_eq!(radius.depth, 2);
    }

    #[test]
    fn diamond_visits_shared_caller_once() {
        let mut graph = KnowledgeGraph::new();
        functions(&mut graph, &["root", "left", "right", "top"]);
        calls(&mut graph, "root", "left");
        calls(&mut graph, "root", "right");
        calls(&mut graph, "left", "top");
        calls(&mut graph, "right", "top");
        calls(&mut graph, "root", "left");

        let radius = function_blast_radius(&graph, "root");

        assert_eq!(radius.affected_functions, ["left", "right", "top"]);
        assert_eq!(radius.depth, 2);
    }

    #[test]
    fn unknown_function_is_empty_not_error() {
        let graph = KnowledgeGraph::new();

        let radius = function_blast_radius(&graph, "missing");

        assert!(radius.is_empty());
        assert!(radius.affected_files.is_empty());
        assert_eq!(radius.depth, 0);
    }

    #[test]
    fn dangling_start_id_is_empty() {
        let mut graph = KnowledgeGraph::new();
        graph.add_node(Node::function("B", "B", "b.ts", 1));
        calls(&mut graph, "ghost", "B");

        let radius = function_blast_radius(&graph, "ghost");

        assert_eq!(radius, BlastRadius::default());
    }

    #[test]
    fn file_id_is_not_a_start() {
        let mut graph = KnowledgeGraph::new();
        graph.add_node(Node::file("a.ts"));
        functions(&mut graph, &["B"]);
        calls(&mut graph, "a.ts", "B");

        assert!(function_blast_radius(&graph, "a.ts").is_empty());
    }

    #[test]
    fn files_are_deduplicated() {
        let mut graph = KnowledgeGraph::new();
        graph.add_node(Node::function("f", "f", "lib.ts", 1));
        graph.add_node(Node::function("g", "g", "app.ts", 1));
        graph.add_node(Node::function("h", "h", "app.ts", 9));
        calls(&mut graph, "f", "g");
        calls(&mut graph, "f", "h");

        let radius = function_blast_radius(&graph, "f");

        assert_eq!(radius.affected_files, ["app.ts"]);
        assert_eq!(radius.depth, 1);
    }

    #[test]
    fn non_call_edges_are_ignored() {
        let mut graph = KnowledgeGraph::new();
        functions(&mut graph, &["A", "B", "C"]);
        graph.add_edge(Edge::new("A", "B", EdgeType::Imports));
        graph.add_edge(Edge::new("A", "C", EdgeType::Defines));

        assert!(function_blast_radius(&graph, "A").is_empty());
    }
}
