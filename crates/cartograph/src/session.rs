//! The analysis context of one build, and the session that serves queries
//! against the current one.
//!
//! A context is immutable once built. The session holds the current context
//! behind an `RwLock<Arc<_>>` that is only locked long enough to clone or
//! swap the pointer: a query takes its own `Arc` and keeps answering from that
//! context even if a rebuild swaps in a new one meanwhile.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::builder::{BuildReport, GraphBuilder};
use crate::config::CartographConfig;
use crate::error::Result;
use crate::findings::FindingsStore;
use crate::graph::KnowledgeGraph;
use crate::query::{Orchestrator, QueryResult};

/// Everything a query may read: the graph and the findings it was built from.
#[derive(Debug)]
pub struct AnalysisContext {
    /// The built graph.
    pub graph: KnowledgeGraph,
    /// Findings the graph was built from (history and risks are read directly).
    pub findings: FindingsStore,
    /// Counts from the build.
    pub report: BuildReport,
    /// When the build finished.
    pub built_at: DateTime<Utc>,
}

impl AnalysisContext {
    /// Wrap an already-built graph.
    #[must_use]
    pub fn new(graph: KnowledgeGraph, findings: FindingsStore) -> Self {
        Self {
            graph,
            findings,
            report: BuildReport::default(),
            built_at: Utc::now(),
        }
    }

    /// Build a context from `findings`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoWorkspace`] if there is no structure finding.
    pub fn build(findings: FindingsStore, config: &CartographConfig) -> Result<Self> {
        let (graph, report) = GraphBuilder::new(config.build.batch_size).build(&findings)?;
        Ok(Self {
            graph,
            findings,
            report,
            built_at: Utc::now(),
        })
    }
}

/// Serves queries against the current analysis context.
pub struct Session {
    current: RwLock<Arc<AnalysisContext>>,
    orchestrator: Orchestrator,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("built_at", &self.current().built_at)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session starting from `context`.
    #[must_use]
    pub fn new(context: AnalysisContext, orchestrator: Orchestrator) -> Self {
        Self {
            current: RwLock::new(Arc::new(context)),
            orchestrator,
        }
    }

    /// The current context.
    #[must_use]
    pub fn current(&self) -> Arc<AnalysisContext> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Make `context` current, returning the one it replaced.
    pub fn replace(&self, context: AnalysisContext) -> Arc<AnalysisContext> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(context))
    }

    /// Build from `findings` and make the result current.
    ///
    /// The build runs without holding the lock. On failure the current context
    /// is left in place.
    ///
    /// # Errors
    ///
    /// Returns the build error; see [`AnalysisContext::build`].
    pub fn rebuild(&self, findings: FindingsStore, config: &CartographConfig) -> Result<()> {
        let context = AnalysisContext::build(findings, config)?;
        let nodes = context.graph.node_count();
        self.replace(context);
        info!(nodes, "Analysis context replaced");
        Ok(())
    }

    /// Answer `question` against the current context.
    #[must_use]
    pub fn run_query(&self, question: &str) -> QueryResult {
        let context = self.current();
        self.orchestrator.run_query(&context, question)
    }
}
