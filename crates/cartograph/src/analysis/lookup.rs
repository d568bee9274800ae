//! Direct lookups: names, neighbors, and file resolution.

use std::collections::HashSet;

use crate::graph::{EdgeType, KnowledgeGraph, Node, NodeType};

/// Function nodes whose name matches exactly (case-sensitive), in insertion order.
#[must_use]
pub fn find_function_by_name<'g>(graph: &'g KnowledgeGraph, name: &str) -> Vec<&'g Node> {
    graph
        .get_nodes_by_type(NodeType::Function)
        .into_iter()
        .filter(|node| node.as_function().is_some_and(|f| f.name == name))
        .collect()
}

/// Id of the file defining a function.
///
/// Prefers the function's own `file` attribute and falls back to the source of
/// an incoming `DEFINES` edge.
#[must_use]
pub fn defining_file<'g>(graph: &'g KnowledgeGraph, function_id: &str) -> Option<&'g str> {
    if let Some(function) = graph.get_node(function_id).and_then(Node::as_function) {
        return Some(function.file.as_str());
    }
    graph
        .incoming_of_type(function_id, EdgeType::Defines)
        .next()
        .map(|edge| edge.from.as_str())
}

/// Functions that call `function_id` directly.
#[must_use]
pub fn callers_of<'g>(graph: &'g KnowledgeGraph, function_id: &str) -> Vec<&'g str> {
    distinct(
        graph
            .outgoing_of_type(function_id, EdgeType::Calls)
            .map(|edge| edge.to.as_str()),
    )
}

/// Functions that `function_id` calls directly.
#[must_use]
pub fn callees_of<'g>(graph: &'g KnowledgeGraph, function_id: &str) -> Vec<&'g str> {
    distinct(
        graph
            .incoming_of_type(function_id, EdgeType::Calls)
            .map(|edge| edge.from.as_str()),
    )
}

/// Functions defined in a file.
#[must_use]
pub fn functions_defined_in<'g>(graph: &'g KnowledgeGraph, file_id: &str) -> Vec<&'g str> {
    distinct(
        graph
            .outgoing_of_type(file_id, EdgeType::Defines)
            .map(|edge| edge.to.as_str()),
    )
}

/// Files that `file_id` imports.
#[must_use]
pub fn import_dependencies<'g>(graph: &'g KnowledgeGraph, file_id: &str) -> Vec<&'g str> {
    distinct(
        graph
            .outgoing_of_type(file_id, EdgeType::Imports)
            .map(|edge| edge.to.as_str()),
    )
}

/// Files that import `file_id`.
#[must_use]
pub fn import_dependents<'g>(graph: &'g KnowledgeGraph, file_id: &str) -> Vec<&'g str> {
    distinct(
        graph
            .incoming_of_type(file_id, EdgeType::Imports)
            .map(|edge| edge.from.as_str()),
    )
}

/// Map a user-supplied path onto a file node id.
///
/// Tries, in order: exact id, a file whose id ends with `/target`, a file whose
/// name equals `target`. The first match in insertion order wins.
#[must_use]
pub fn resolve_file<'g>(graph: &'g KnowledgeGraph, target: &str) -> Option<&'g str> {
    let target = target.trim_start_matches("./");
    if let Some(node) = graph.get_node(target) {
        if node.node_type() == NodeType::File {
            return Some(node.id.as_str());
        }
    }

    let files = graph.get_nodes_by_type(NodeType::File);
    let suffix = format!("/{target}");
    files
        .iter()
        .find(|node| node.id.ends_with(&suffix))
        .or_else(|| files.iter().find(|node| node.label() == target))
        .map(|node| node.id.as_str())
}

fn distinct<'g>(ids: impl Iterator<Item = &'g str>) -> Vec<&'g str> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
