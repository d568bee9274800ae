//! JSON snapshots of a built graph.
//!
//! A snapshot is a node-link document for external visualizers:
//!
//! ```json
//! {
//!   "nodes": [{"id": "/r/a.ts", "label": "a.ts", "type": "file", "path": "/r/a.ts", "name": "a.ts"}],
//!   "links": [{"source": "/r/a.ts", "target": "/r/b.ts", "type": "IMPORTS"}]
//! }
//! ```
//!
//! Links keep the graph's edge direction. `CALLS` links run from the called
//! function to its caller (`source` is the callee), the direction in which a
//! change propagates. `IMPORTS` links run from importer to imported file and
//! `DEFINES` links from file to function.
//!
//! Node attributes are flattened next to `id`, `label` and `type`. Snapshots
//! are written to a temporary file and renamed into place, so a reader never
//! sees a partial document.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::graph::{EdgeType, KnowledgeGraph, NodeData, NodeType};

/// Borrowed node-link view of a graph, ready to serialize.
#[derive(Debug, Serialize)]
pub struct GraphSnapshot<'g> {
    /// Every node, in insertion order.
    pub nodes: Vec<SnapshotNode<'g>>,
    /// Every edge, in insertion order.
    pub links: Vec<SnapshotLink<'g>>,
}

/// One node in a snapshot.
#[derive(Debug, Serialize)]
pub struct SnapshotNode<'g> {
    /// Node id.
    pub id: &'g str,
    /// Display label.
    pub label: &'g str,
    /// Node type.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Type-specific attributes, flattened into the node object.
    #[serde(flatten)]
    pub data: &'g NodeData,
}

/// One edge in a snapshot.
#[derive(Debug, Serialize)]
pub struct SnapshotLink<'g> {
    /// Source node id.
    pub source: &'g str,
    /// Target node id.
    pub target: &'g str,
    /// Edge type.
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl<'g> GraphSnapshot<'g> {
    /// Node-link view of `graph`.
    #[must_use]
    pub fn of(graph: &'g KnowledgeGraph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|node| SnapshotNode {
                    id: &node.id,
                    label: node.label(),
                    node_type: node.node_type(),
                    data: &node.data,
                })
                .collect(),
            links: graph
                .edges()
                .iter()
                .map(|edge| SnapshotLink {
                    source: &edge.from,
                    target: &edge.to,
                    edge_type: edge.edge_type,
                })
                .collect(),
        }
    }
}

/// File name for a snapshot taken now: `graph-<UTC timestamp>.json`.
#[must_use]
pub fn snapshot_file_name() -> String {
    format!(
        "graph-{}.json",
        chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
    )
}

/// Write a snapshot of `graph` into `dir`, creating the directory if needed.
///
/// Returns the path of the written snapshot.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written or renamed. On failure no partial snapshot is left at the target
/// path.
pub fn write_snapshot(graph: &KnowledgeGraph, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_file_name());
    let temp_path = make_temp_path(&path);

    if let Err(e) = write_to_temp_file(&temp_path, &GraphSnapshot::of(graph)) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    fs::rename(&temp_path, &path)?;

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Snapshot written"
    );
    Ok(path)
}

fn make_temp_path(path: &Path) -> PathBuf {
    let mut extension = path
        .extension()
        .map(ToOwned::to_owned)
        .unwrap_or_default();
    if extension.is_empty() {
        extension = OsString::from("tmp");
    } else {
        extension.push(".tmp");
    }
    path.with_extension(extension)
}

fn write_to_temp_file(temp_path: &Path, snapshot: &GraphSnapshot<'_>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(temp_path)?);
    serde_json::to_writer(&mut writer, snapshot)?;
    writer.flush()?;
    Ok(())
}
