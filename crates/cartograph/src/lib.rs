//! # Cartograph: Structural Knowledge Graph for Codebases
//!
//! Cartograph turns facts reported by external collaborators (workspace
//! scanner, function extractor, import resolver, history miner, risk scanner)
//! into a typed graph of files, folders and functions, and answers structural
//! questions about it.
//!
//! ## Design Philosophy
//!
//! - **Facts from collaborators** - Cartograph never parses source code; it
//!   links what collaborators report
//! - **Degrade, don't fail** - A missing or broken collaborator removes its
//!   layer of the graph; only a missing workspace enumeration is fatal
//! - **Facts before prose** - Query answers come from graph logic; optional
//!   explanation text can never change them
//!
//! ## Quick Start
//!
//! ```no_run
//! use cartograph::Cartograph;
//! use std::path::Path;
//!
//! let cartograph = Cartograph::new(Path::new("/path/to/workspace"))?;
//!
//! // Collect findings and build the graph
//! let session = cartograph.session()?;
//!
//! let result = session.run_query("who calls computeTotal");
//! println!("{} callers", result.functions.len());
//! # Ok::<(), cartograph::Error>(())
//! ```

pub mod analysis;
pub mod builder;
pub mod collaborator;
pub mod config;
mod error;
pub mod findings;
pub mod graph;
pub mod query;
pub mod session;
pub mod snapshot;

pub use builder::{BuildReport, GraphBuilder};
pub use collaborator::{Collaborator, CollaboratorRunner, Collection, FileCollaborator};
pub use config::CartographConfig;
pub use error::{CollaboratorError, Error, Result};
pub use findings::{CollaboratorKind, Finding, FindingsStore};
pub use graph::{Edge, EdgeType, KnowledgeGraph, Node, NodeType};
pub use query::{Orchestrator, QueryResult};
pub use session::{AnalysisContext, Session};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::CARTOGRAPH_DIR_NAME;

/// Entry point tying a workspace to its configuration and findings.
#[derive(Debug, Clone)]
pub struct Cartograph {
    workspace_root: PathBuf,
    config: CartographConfig,
    findings_dir: PathBuf,
}

impl Cartograph {
    /// Open `workspace`, loading `.cartograph/config.yaml` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but is unreadable or
    /// invalid.
    pub fn new(workspace: &Path) -> Result<Self> {
        let config = CartographConfig::load_for(workspace)?;
        Ok(Self::with_config(workspace, config))
    }

    /// Open `workspace` with an explicit configuration.
    #[must_use]
    pub fn with_config(workspace: &Path, config: CartographConfig) -> Self {
        let findings_dir = config.findings_dir(workspace);
        Self {
            workspace_root: workspace.to_path_buf(),
            config,
            findings_dir,
        }
    }

    /// Read findings from `dir` instead of the configured directory.
    #[must_use]
    pub fn with_findings_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.findings_dir = dir.into();
        self
    }

    /// Write a default configuration and create the findings directory.
    ///
    /// Returns the configuration path. An existing configuration is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the file cannot be written.
    pub fn init(workspace: &Path) -> Result<PathBuf> {
        let config = CartographConfig::default();
        let config_path = CartographConfig::path_in(workspace);

        fs::create_dir_all(workspace.join(CARTOGRAPH_DIR_NAME))?;
        fs::create_dir_all(config.findings_dir(workspace))?;
        if config_path.exists() {
            debug!(path = %config_path.display(), "Keeping existing configuration");
        } else {
            config.save(&config_path)?;
            info!(path = %config_path.display(), "Wrote default configuration");
        }
        Ok(config_path)
    }

    /// The workspace root.
    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &CartographConfig {
        &self.config
    }

    /// Directory the file collaborators read from.
    #[must_use]
    pub fn findings_dir(&self) -> &Path {
        &self.findings_dir
    }

    /// Run the file collaborators for this workspace.
    #[must_use]
    pub fn collect(&self) -> Collection {
        let runner = CollaboratorRunner::new(self.config.collaborators.timeout());
        runner.run(&FileCollaborator::all_in_dir(&self.findings_dir))
    }

    /// Collect findings and build an analysis context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoWorkspace`] if no structure finding was collected.
    pub fn analyze(&self) -> Result<AnalysisContext> {
        let collection = self.collect();
        for failure in &collection.failures {
            warn!(collaborator = %failure.kind(), error = %failure, "Finding unavailable");
        }
        AnalysisContext::build(collection.findings, &self.config)
    }

    /// Collect, build, and wrap the result in a query session.
    ///
    /// # Errors
    ///
    /// See [`Cartograph::analyze`].
    pub fn session(&self) -> Result<Session> {
        let context = self.analyze()?;
        Ok(Session::new(context, Orchestrator::new(&self.config)))
    }

    /// Write a snapshot of `context` to the configured snapshot directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn write_snapshot(&self, context: &AnalysisContext) -> Result<PathBuf> {
        snapshot::write_snapshot(&context.graph, &self.config.snapshot_dir(&self.workspace_root))
    }
}
