//! Typed node/edge store for the structural knowledge graph.
//!
//! ## Design
//!
//! - Nodes are keyed by id; per-type insertion order is kept separately so
//!   `get_nodes_by_type` is stable across runs
//! - Edges live in one append-only vector; adjacency is a pair of index lists
//!   per node id, maintained on insert, so neighbor queries never scan all edges
//! - Nothing here validates endpoints: an edge may name an id that was never
//!   inserted, and duplicate edges are kept
//!
//! The graph is populated during a build and read-only afterwards. Queries
//! take `&KnowledgeGraph`, so sharing a finished graph behind an `Arc` needs no
//! locking.

mod types;

pub use types::{
    Edge, EdgeType, FileData, FolderData, FunctionData, GraphStats, Node, NodeData, NodeType,
};

use std::collections::HashMap;

use tracing::warn;

/// Typed graph of files, folders and functions.
#[derive(Debug, Default, Clone)]
pub struct KnowledgeGraph {
    nodes: HashMap<String, Node>,
    /// Global insertion order of node ids.
    order: Vec<String>,
    by_type: HashMap<NodeType, Vec<String>>,
    edges: Vec<Edge>,
    outgoing: HashMap<String, Vec<usize>>,
    incoming: HashMap<String, Vec<usize>>,
}

impl KnowledgeGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or overwrite the data of an existing node with the same id.
    ///
    /// A node's type never changes: an overwrite whose data variant disagrees
    /// with the stored type is ignored.
    pub fn add_node(&mut self, node: Node) {
        let node_type = node.node_type();

        if let Some(existing) = self.nodes.get_mut(&node.id) {
            if existing.node_type() == node_type {
                existing.data = node.data;
            } else {
                warn!(
                    id = %node.id,
                    stored = %existing.node_type(),
                    rejected = %node_type,
                    "Ignoring re-insert that would change node type"
                );
            }
            return;
        }

        self.order.push(node.id.clone());
        self.by_type
            .entry(node_type)
            .or_default()
            .push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }

    /// Append an edge. Duplicates and dangling endpoints are accepted.
    pub fn add_edge(&mut self, edge: Edge) {
        let index = self.edges.len();
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(index);
        self.incoming.entry(edge.to.clone()).or_default().push(index);
        self.edges.push(edge);
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether a node with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes of one type, in the order they were first inserted.
    #[must_use]
    pub fn get_nodes_by_type(&self, node_type: NodeType) -> Vec<&Node> {
        self.by_type
            .get(&node_type)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default()
    }

    /// Edges whose `from` is `id`, in insertion order.
    #[must_use]
    pub fn get_outgoing_edges(&self, id: &str) -> Vec<&Edge> {
        self.edges_at(self.outgoing.get(id))
    }

    /// Edges whose `to` is `id`, in insertion order.
    #[must_use]
    pub fn get_incoming_edges(&self, id: &str) -> Vec<&Edge> {
        self.edges_at(self.incoming.get(id))
    }

    /// Outgoing edges of one type.
    pub fn outgoing_of_type<'a>(
        &'a self,
        id: &str,
        edge_type: EdgeType,
    ) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.indexed(self.outgoing.get(id))
            .filter(move |edge| edge.edge_type == edge_type)
    }

    /// Incoming edges of one type.
    pub fn incoming_of_type<'a>(
        &'a self,
        id: &str,
        edge_type: EdgeType,
    ) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.indexed(self.incoming.get(id))
            .filter(move |edge| edge.edge_type == edge_type)
    }

    /// Number of distinct node ids.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, duplicates included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All nodes in global insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// All edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Per-type node and edge counts.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let count = |t: NodeType| self.by_type.get(&t).map_or(0, Vec::len);
        let mut stats = GraphStats {
            files: count(NodeType::File),
            folders: count(NodeType::Folder),
            functions: count(NodeType::Function),
            ..GraphStats::default()
        };
        for edge in &self.edges {
            match edge.edge_type {
                EdgeType::Imports => stats.imports += 1,
                EdgeType::Defines => stats.defines += 1,
                EdgeType::Calls => stats.calls += 1,
            }
        }
        stats
    }

    fn edges_at<'a>(&'a self, indices: Option<&'a Vec<usize>>) -> Vec<&'a Edge> {
        self.indexed(indices).collect()
    }

    fn indexed<'a>(
        &'a self,
        indices: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a Edge> + use<'a> {
        indices
            .into_iter()
            .flatten()
            .filter_map(|&index| self.edges.get(index))
    }
}
