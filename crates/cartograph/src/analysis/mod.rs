//! Read-only algorithms over the knowledge graph.
//!
//! | Operation | Algorithm |
//! |-----------|-----------|
//! | Blast radius | BFS over `CALLS` edges (callee → caller) |
//! | Function centrality | `CALLS` in-degree + out-degree |
//! | File importance | Weighted `DEFINES` out-degree + distinct importers |
//! | Import cycles | Iterative DFS with an on-path set |
//! | Dependency chain | A* with unit costs (petgraph) |
//!
//! Nothing here mutates the graph or returns an error: unknown ids degrade to
//! empty results.

mod blast;
mod chain;
mod cycles;
mod lookup;
mod ranking;

pub use blast::{BlastRadius, function_blast_radius};
pub use chain::dependency_chain;
pub use cycles::{Cycle, find_cycles, import_cycles};
pub use lookup::{
    callees_of, callers_of, defining_file, find_function_by_name, functions_defined_in,
    import_dependencies, import_dependents, resolve_file,
};
pub use ranking::{
    FileImportance, FunctionCentrality, ImportanceWeights, file_importance, function_centrality,
};
