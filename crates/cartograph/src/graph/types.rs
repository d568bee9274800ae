//! Node and edge types stored in the knowledge graph.
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Node attributes | Typed `NodeData` enum | The variant fixes the node type |
//! | Node ids | `String` | Paths for files/folders, extractor-assigned ids for functions |
//! | Edge endpoints | Ids, not indices | Dangling endpoints are legal |

use serde::{Deserialize, Serialize};

/// The kind of structural entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A source file
    File,
    /// A directory
    Folder,
    /// A function-like unit (function, method, closure bound to a name)
    Function,
}

impl NodeType {
    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
            Self::Function => "function",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The relationship an edge represents.
///
/// `CALLS` edges point from the callee to the caller, i.e. in the direction a
/// change propagates. See [`crate::analysis::function_blast_radius`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    /// File imports file (`from` imports `to`)
    Imports,
    /// File defines function (`from` is the file)
    Defines,
    /// Call relationship (`from` is the callee, `to` the caller)
    Calls,
}

impl EdgeType {
    /// Stable uppercase name, as used in snapshots.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imports => "IMPORTS",
            Self::Defines => "DEFINES",
            Self::Calls => "CALLS",
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a file node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    /// Path of the file (same as the node id).
    pub path: String,
    /// Final path component.
    pub name: String,
}

/// Attributes of a folder node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderData {
    /// Path of the folder (same as the node id).
    pub path: String,
    /// Final path component.
    pub name: String,
}

/// Attributes of a function node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionData {
    /// Function name as written in source.
    pub name: String,
    /// Id of the defining file.
    pub file: String,
    /// 1-based line where the function starts.
    pub start_line: u32,
    /// Callee names as extracted, unresolved.
    pub calls: Vec<String>,
}

/// Type-specific node attributes. The variant determines the node's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeData {
    /// File attributes
    File(FileData),
    /// Folder attributes
    Folder(FolderData),
    /// Function attributes
    Function(FunctionData),
}

impl NodeData {
    /// The node type implied by this data.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::File(_) => NodeType::File,
            Self::Folder(_) => NodeType::Folder,
            Self::Function(_) => NodeType::Function,
        }
    }
}

/// A node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Globally unique id for the lifetime of a build.
    pub id: String,
    /// Type-specific attributes.
    pub data: NodeData,
}

impl Node {
    /// Create a file node whose id is its path.
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            data: NodeData::File(FileData {
                name: last_component(&path).to_string(),
                path,
            }),
        }
    }

    /// Create a folder node whose id is its path.
    #[must_use]
    pub fn folder(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            data: NodeData::Folder(FolderData {
                name: last_component(&path).to_string(),
                path,
            }),
        }
    }

    /// Create a function node.
    #[must_use]
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        file: impl Into<String>,
        start_line: u32,
    ) -> Self {
        Self {
            id: id.into(),
            data: NodeData::Function(FunctionData {
                name: name.into(),
                file: file.into(),
                start_line,
                calls: Vec::new(),
            }),
        }
    }

    /// The node's type.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    /// Short display label: file/folder name or function name.
    #[must_use]
    pub fn label(&self) -> &str {
        match &self.data {
            NodeData::File(file) => &file.name,
            NodeData::Folder(folder) => &folder.name,
            NodeData::Function(function) => &function.name,
        }
    }

    /// Function attributes, if this is a function node.
    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionData> {
        match &self.data {
            NodeData::Function(function) => Some(function),
            _ => None,
        }
    }
}

/// A directed, typed edge. Endpoints are not required to exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Relationship type.
    pub edge_type: EdgeType,
}

impl Edge {
    /// Create a new edge.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            edge_type,
        }
    }
}

/// Node and edge counts for a built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    /// Number of file nodes.
    pub files: usize,
    /// Number of folder nodes.
    pub folders: usize,
    /// Number of function nodes.
    pub functions: usize,
    /// Number of `IMPORTS` edges.
    pub imports: usize,
    /// Number of `DEFINES` edges.
    pub defines: usize,
    /// Number of `CALLS` edges.
    pub calls: usize,
}

impl GraphStats {
    /// Total node count.
    #[must_use]
    pub fn nodes(&self) -> usize {
        self.files + self.folders + self.functions
    }

    /// Total edge count.
    #[must_use]
    pub fn edges(&self) -> usize {
        self.imports + self.defines + self.calls
    }
}

fn last_component(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
}
