//! Centrality and importance rankings.
//!
//! Both rankings are deterministic: primary order is the score, descending;
//! ties are broken by node id, ascending.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{EdgeType, KnowledgeGraph, NodeType};

/// Call-graph degree of one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCentrality {
    /// Function node id.
    pub id: String,
    /// Function name.
    pub name: String,
    /// Defining file.
    pub file: String,
    /// Incoming `CALLS` edges.
    pub in_degree: usize,
    /// Outgoing `CALLS` edges.
    pub out_degree: usize,
    /// `in_degree + out_degree`.
    pub centrality: usize,
}

/// Composite importance of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileImportance {
    /// File node id.
    pub id: String,
    /// Number of `DEFINES` edges leaving the file.
    pub function_count: usize,
    /// Number of distinct files importing this one.
    pub importer_count: usize,
    /// Weighted score used for ordering.
    pub importance: f64,
}

/// Weights of the file-importance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ImportanceWeights {
    /// Weight per defined function.
    pub define_weight: f64,
    /// Weight per distinct importer.
    pub importer_weight: f64,
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            define_weight: 1.0,
            importer_weight: 2.0,
        }
    }
}

/// Degree centrality of every function over `CALLS` edges.
#[must_use]
pub fn function_centrality(graph: &KnowledgeGraph) -> Vec<FunctionCentrality> {
    let mut ranked: Vec<FunctionCentrality> = graph
        .get_nodes_by_type(NodeType::Function)
        .into_iter()
        .map(|node| {
            let in_degree = graph.incoming_of_type(&node.id, EdgeType::Calls).count();
            let out_degree = graph.outgoing_of_type(&node.id, EdgeType::Calls).count();
            let (name, file) = node
                .as_function()
                .map(|f| (f.name.clone(), f.file.clone()))
                .unwrap_or_default();
            FunctionCentrality {
                id: node.id.clone(),
                name,
                file,
                in_degree,
                out_degree,
                centrality: in_degree + out_degree,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.centrality
            .cmp(&a.centrality)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}

/// Importance of every file: how much it defines and how widely it is imported.
#[must_use]
pub fn file_importance(graph: &KnowledgeGraph, weights: ImportanceWeights) -> Vec<FileImportance> {
    let mut ranked: Vec<FileImportance> = graph
        .get_nodes_by_type(NodeType::File)
        .into_iter()
        .map(|node| {
            let function_count = graph.outgoing_of_type(&node.id, EdgeType::Defines).count();
            let importer_count = graph
                .incoming_of_type(&node.id, EdgeType::Imports)
                .map(|edge| edge.from.as_str())
                .collect::<HashSet<_>>()
                .len();
            #[allow(clippy::cast_precision_loss)] // counts are far below 2^52
            let importance = weights.define_weight * function_count as f64
                + weights.importer_weight * importer_count as f64;
            FileImportance {
                id: node.id.clone(),
                function_count,
                importer_count,
                importance,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}
