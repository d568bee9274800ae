//! Builds a knowledge graph from collaborator findings.
//!
//! ## Phases
//!
//! ```text
//! 1. Structure     folders and files become nodes         (required)
//! 2. Extraction    functions become nodes, DEFINES edges  (batched)
//! 3. Calls         callee names resolved to CALLS edges   (batched)
//! 4. Dependencies  import pairs become IMPORTS edges
//! ```
//!
//! Only the structure finding is required. Every other missing finding is
//! logged and skipped, leaving the graph without that layer.
//!
//! ## Call resolution
//!
//! A callee name resolves to the first function node (in insertion order)
//! whose name equals it, or failing that, whose id ends with the name right
//! after a `::` or `.` separator. Names that resolve nowhere are dropped. When
//! several functions share a name the first one wins; no attempt is made to
//! pick the "right" one by scope.

use std::collections::HashMap;
use std::thread;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::findings::{CollaboratorKind, ExtractedFunction, FindingsStore};
use crate::graph::{Edge, EdgeType, KnowledgeGraph, Node, NodeData, NodeType};

/// Separators after which an id suffix is matched against a callee name.
const NAMESPACE_SEPARATORS: [&str; 2] = ["::", "."];

/// Default number of extracted functions processed per batch.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Counts describing one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// File nodes added.
    pub files: usize,
    /// Folder nodes added.
    pub folders: usize,
    /// Function nodes added.
    pub functions: usize,
    /// `DEFINES` edges dropped because the defining file is unknown.
    pub orphan_functions: usize,
    /// Callee names resolved to `CALLS` edges.
    pub calls_resolved: usize,
    /// Callee names dropped as unresolved.
    pub calls_unresolved: usize,
    /// `IMPORTS` edges added.
    pub imports: usize,
    /// Import pairs dropped because an endpoint is not a known file.
    pub imports_dropped: usize,
    /// Collaborators whose finding was absent.
    pub missing: Vec<CollaboratorKind>,
}

/// Turns a [`FindingsStore`] into a [`KnowledgeGraph`].
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    batch_size: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl GraphBuilder {
    /// Builder processing `batch_size` functions between yields (minimum 1).
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Build a fresh graph from `findings`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoWorkspace`] if there is no structure finding. All
    /// other gaps degrade to a smaller graph.
    pub fn build(&self, findings: &FindingsStore) -> Result<(KnowledgeGraph, BuildReport)> {
        let structure = findings
            .structure()
            .ok_or(Error::NoWorkspace(CollaboratorKind::Structure))?;

        let mut graph = KnowledgeGraph::new();
        let mut report = BuildReport {
            missing: findings.missing(),
            ..BuildReport::default()
        };

        for folder in &structure.data.folders {
            graph.add_node(Node::folder(folder.as_str()));
        }
        for file in &structure.data.files {
            graph.add_node(Node::file(file.as_str()));
        }
        report.folders = structure.data.folders.len();
        report.files = structure.data.files.len();

        match findings.extraction() {
            Some(extraction) => {
                self.add_functions(&mut graph, &extraction.data.functions, &mut report);
                self.resolve_calls(&mut graph, &mut report);
            }
            None => warn!("No extraction finding; graph has no functions or calls"),
        }

        match findings.dependencies() {
            Some(dependencies) => {
                for pair in &dependencies.data.dependencies {
                    if is_file(&graph, &pair.from) && is_file(&graph, &pair.to) {
                        graph.add_edge(Edge::new(&pair.from, &pair.to, EdgeType::Imports));
                        report.imports += 1;
                    } else {
                        trace!(from = %pair.from, to = %pair.to, "Dropping import with unknown endpoint");
                        report.imports_dropped += 1;
                    }
                }
            }
            None => warn!("No dependencies finding; graph has no imports"),
        }

        info!(
            files = report.files,
            functions = report.functions,
            calls = report.calls_resolved,
            imports = report.imports,
            unresolved_calls = report.calls_unresolved,
            dropped_imports = report.imports_dropped,
            "Graph built"
        );
        Ok((graph, report))
    }

    fn add_functions(
        &self,
        graph: &mut KnowledgeGraph,
        functions: &[ExtractedFunction],
        report: &mut BuildReport,
    ) {
        for (batch, chunk) in functions.chunks(self.batch_size).enumerate() {
            for function in chunk {
                let mut node = Node::function(
                    function.id.as_str(),
                    function.name.as_str(),
                    function.file.as_str(),
                    function.start_line,
                );
                if let NodeData::Function(data) = &mut node.data {
                    data.calls.clone_from(&function.calls);
                }
                graph.add_node(node);
                report.functions += 1;

                if is_file(graph, &function.file) {
                    graph.add_edge(Edge::new(&function.file, &function.id, EdgeType::Defines));
                } else {
                    report.orphan_functions += 1;
                }
            }
            debug!(batch, size = chunk.len(), "Function batch added");
            thread::yield_now();
        }
    }

    fn resolve_calls(&self, graph: &mut KnowledgeGraph, report: &mut BuildReport) {
        let calls: Vec<Edge> = {
            let index = CallIndex::new(graph);
            let functions = graph.get_nodes_by_type(NodeType::Function);
            let mut edges = Vec::new();

            for (batch, chunk) in functions.chunks(self.batch_size).enumerate() {
                for caller in chunk {
                    let Some(data) = caller.as_function() else {
                        continue;
                    };
                    for callee_name in &data.calls {
                        match index.resolve(callee_name) {
                            Some(callee) => {
                                edges.push(Edge::new(callee, caller.id.as_str(), EdgeType::Calls));
                                report.calls_resolved += 1;
                            }
                            None => {
                                trace!(caller = %caller.id, callee = %callee_name, "Unresolved call dropped");
                                report.calls_unresolved += 1;
                            }
                        }
                    }
                }
                debug!(batch, resolved = report.calls_resolved, "Call batch resolved");
                thread::yield_now();
            }
            edges
        };

        for edge in calls {
            graph.add_edge(edge);
        }
    }
}

/// Name and id-suffix lookup for call resolution; first insertion wins.
struct CallIndex<'g> {
    by_name: HashMap<&'g str, &'g str>,
    by_suffix: HashMap<&'g str, &'g str>,
}

impl<'g> CallIndex<'g> {
    fn new(graph: &'g KnowledgeGraph) -> Self {
        let mut by_name = HashMap::new();
        let mut by_suffix = HashMap::new();

        for node in graph.get_nodes_by_type(NodeType::Function) {
            let id = node.id.as_str();
            if let Some(data) = node.as_function() {
                by_name.entry(data.name.as_str()).or_insert(id);
            }
            for separator in NAMESPACE_SEPARATORS {
                for (position, _) in id.match_indices(separator) {
                    let suffix = &id[position + separator.len()..];
                    if !suffix.is_empty() {
                        by_suffix.entry(suffix).or_insert(id);
                    }
                }
            }
        }

        Self { by_name, by_suffix }
    }

    fn resolve(&self, name: &str) -> Option<&'g str> {
        self.by_name
            .get(name)
            .or_else(|| self.by_suffix.get(name))
            .copied()
    }
}

fn is_file(graph: &KnowledgeGraph, id: &str) -> bool {
    graph
        .get_node(id)
        .is_some_and(|node| node.node_type() == NodeType::File)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{callers_of, function_blast_radius};
    use crate::findings::{
        AgentFinding, DependencyData, DependencyPair, ExtractionData, Finding, StructureData,
    };

    fn function(id: &str, name: &str, file: &str, calls: &[&str]) -> ExtractedFunction {
        ExtractedFunction {
            id: id.into(),
            name: name.into(),
            file: file.into(),
            start_line: 1,
            calls: calls.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    fn findings(functions: Vec<ExtractedFunction>, imports: &[(&str, &str)]) -> FindingsStore {
        let mut store = FindingsStore::new();
        store.insert(Finding::Structure(AgentFinding::now(
            "scanner",
            StructureData {
                folders: vec!["/r".into()],
                files: vec!["/r/a.ts".into(), "/r/b.ts".into()],
            },
        )));
        store.insert(Finding::Extraction(AgentFinding::now(
            "extractor",
            ExtractionData { functions },
        )));
        store.insert(Finding::Dependencies(AgentFinding::now(
            "resolver",
            DependencyData {
                dependencies: imports
                    .iter()
                    .map(|(from, to)| DependencyPair {
                        from: (*from).into(),
                        to: (*to).into(),
                    })
                    .collect(),
            },
        )));
        store
    }

    #[test]
    fn missing_structure_is_a_hard_failure() {
        let result = GraphBuilder::default().build(&FindingsStore::new());

        assert!(matches!(
            result,
            Err(Error::NoWorkspace(CollaboratorKind::Structure))
        ));
    }

    #[test]
    fn structure_only_builds_file_and_folder_nodes() {
        let mut store = FindingsStore::new();
        store.insert(Finding::Structure(AgentFinding::now(
            "scanner",
            StructureData {
                folders: vec!["/r".into()],
                files: vec!["/r/a.ts".into()],
            },
        )));

        let (graph, report) = GraphBuilder::default().build(&store).expect("build failed");

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(report.missing.contains(&CollaboratorKind::Extraction));
    }

    #[test]
    fn calls_point_from_callee_to_caller() {
        let store = findings(
            vec![
                function("/r/a.ts::main", "main", "/r/a.ts", &["helper"]),
                function("/r/b.ts::helper", "helper", "/r/b.ts", &[]),
            ],
            &[],
        );

        let (graph, report) = GraphBuilder::default().build(&store).expect("build failed");

        assert_eq!(report.calls_resolved, 1);
        assert_eq!(callers_of(&graph, "/r/b.ts::helper"), ["/r/a.ts::main"]);
        let radius = function_blast_radius(&graph, "/r/b.ts::helper");
        assert_eq!(radius.affected_functions, ["/r/a.ts::main"]);
        assert_eq!(radius.affected_files, ["/r/a.ts"]);
    }

    #[test]
    fn ambiguous_name_resolves_to_first_inserted() {
        let store = findings(
            vec![
                function("/r/a.ts::log", "log", "/r/a.ts", &[]),
                function("/r/b.ts::log", "log", "/r/b.ts", &[]),
                function("/r/b.ts::run", "run", "/r/b.ts", &["log"]),
            ],
            &[],
        );

        let (graph, _) = GraphBuilder::new(1).build(&store).expect("build failed");

        assert_eq!(callers_of(&graph, "/r/a.ts::log"), ["/r/b.ts::run"]);
        assert!(callers_of(&graph, "/r/b.ts::log").is_empty());
    }

    #[test]
    fn id_suffix_is_the_fallback() {
        let store = findings(
            vec![
                function("/r/a.ts::Cart.total", "total", "/r/a.ts", &[]),
                function("/r/b.ts::checkout", "checkout", "/r/b.ts", &["Cart.total"]),
            ],
            &[],
        );

        let (graph, report) = GraphBuilder::default().build(&store).expect("build failed");

        assert_eq!(report.calls_resolved, 1);
        assert_eq!(callers_of(&graph, "/r/a.ts::Cart.total"), ["/r/b.ts::checkout"]);
    }

    #[test]
    fn unresolved_calls_and_imports_are_dropped() {
        let store = findings(
            vec![function("/r/a.ts::main", "main", "/r/a.ts", &["console.log", "fetch"])],
            &[("/r/a.ts", "/r/b.ts"), ("/r/a.ts", "lodash"), ("/elsewhere.ts", "/r/b.ts")],
        );

        let (graph, report) = GraphBuilder::default().build(&store).expect("build failed");

        assert_eq!(report.calls_unresolved, 2);
        assert_eq!(report.calls_resolved, 0);
        assert_eq!(report.imports, 1);
        assert_eq!(report.imports_dropped, 2);
        assert_eq!(graph.stats().calls, 0);
        assert_eq!(graph.stats().imports, 1);
    }

    #[test]
    fn function_in_unknown_file_keeps_node_but_no_defines_edge() {
        let store = findings(vec![function("/x.ts::f", "f", "/x.ts", &[])], &[]);

        let (graph, report) = GraphBuilder::default().build(&store).expect("build failed");

        assert!(graph.get_node("/x.ts::f").is_some());
        assert_eq!(graph.stats().defines, 0);
        assert_eq!(report.orphan_functions, 1);
    }

    #[test]
    fn recursion_creates_self_loop_without_breaking_blast_radius() {
        let store = findings(
            vec![function("/r/a.ts::walk", "walk", "/r/a.ts", &["walk"])],
            &[],
        );

        let (graph, _) = GraphBuilder::default().build(&store).expect("build failed");

        assert_eq!(graph.stats().calls, 1);
        assert!(function_blast_radius(&graph, "/r/a.ts::walk").is_empty());
    }
}
