//! Boundary to the external collaborators that produce findings.
//!
//! Collaborators run one at a time. Each runs on its own thread so a
//! collaborator that exceeds its deadline can be abandoned: its finding is
//! recorded as absent and the build carries on. A collaborator never writes
//! to the graph directly, so abandoning one cannot leave the graph half-built.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::CollaboratorError;
use crate::findings::{CollaboratorKind, Finding, FindingsStore};

/// A producer of one kind of finding.
pub trait Collaborator: Send + Sync {
    /// Which finding this collaborator produces.
    fn kind(&self) -> CollaboratorKind;

    /// Produce the finding.
    ///
    /// # Errors
    ///
    /// Returns a [`CollaboratorError`] when the finding cannot be produced.
    fn collect(&self) -> Result<Finding, CollaboratorError>;
}

/// Reads a collaborator's finding from `<dir>/<kind>.json`.
///
/// This is how collaborators running as separate tools hand their results to
/// Cartograph.
#[derive(Debug, Clone)]
pub struct FileCollaborator {
    kind: CollaboratorKind,
    path: PathBuf,
}

impl FileCollaborator {
    /// Collaborator reading `<dir>/<kind>.json`.
    #[must_use]
    pub fn in_dir(dir: &Path, kind: CollaboratorKind) -> Self {
        Self {
            kind,
            path: dir.join(format!("{}.json", kind.as_str())),
        }
    }

    /// One file collaborator per kind, all reading from `dir`.
    #[must_use]
    pub fn all_in_dir(dir: &Path) -> Vec<Arc<dyn Collaborator>> {
        CollaboratorKind::ALL
            .into_iter()
            .map(|kind| Arc::new(Self::in_dir(dir, kind)) as Arc<dyn Collaborator>)
            .collect()
    }

    /// Path this collaborator reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Collaborator for FileCollaborator {
    fn kind(&self) -> CollaboratorKind {
        self.kind
    }

    fn collect(&self) -> Result<Finding, CollaboratorError> {
        let content = fs::read_to_string(&self.path).map_err(|source| CollaboratorError::Io {
            kind: self.kind,
            source,
        })?;
        Finding::from_json(self.kind, &content).map_err(|e| CollaboratorError::Malformed {
            kind: self.kind,
            message: format!("{}: {e}", self.path.display()),
        })
    }
}

/// Findings gathered from a set of collaborators, plus what went wrong.
#[derive(Debug, Default)]
pub struct Collection {
    /// Findings from collaborators that succeeded.
    pub findings: FindingsStore,
    /// Failures, one per collaborator that did not contribute.
    pub failures: Vec<CollaboratorError>,
}

/// Runs collaborators sequentially with a per-collaborator deadline.
#[derive(Debug, Clone, Copy)]
pub struct CollaboratorRunner {
    timeout: Duration,
}

impl CollaboratorRunner {
    /// Runner that abandons any collaborator running longer than `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run every collaborator, keeping the successful findings.
    ///
    /// A collaborator whose finding has the wrong kind is treated as malformed.
    #[must_use]
    pub fn run(&self, collaborators: &[Arc<dyn Collaborator>]) -> Collection {
        let mut collection = Collection::default();

        for collaborator in collaborators {
            let kind = collaborator.kind();
            let start = Instant::now();

            match self.run_one(Arc::clone(collaborator)) {
                Ok(finding) if finding.kind() == kind => {
                    debug!(
                        collaborator = %kind,
                        elapsed_ms = start.elapsed().as_millis(),
                        "Collaborator finished"
                    );
                    collection.findings.insert(finding);
                }
                Ok(finding) => {
                    let error = CollaboratorError::Malformed {
                        kind,
                        message: format!("produced a {} finding", finding.kind()),
                    };
                    warn!(collaborator = %kind, error = %error, "Discarding finding");
                    collection.failures.push(error);
                }
                Err(error) => {
                    warn!(collaborator = %kind, error = %error, "Collaborator failed, finding absent");
                    collection.failures.push(error);
                }
            }
        }

        info!(
            collected = CollaboratorKind::ALL.len() - collection.findings.missing().len(),
            failed = collection.failures.len(),
            "Collaborators finished"
        );
        collection
    }

    fn run_one(&self, collaborator: Arc<dyn Collaborator>) -> Result<Finding, CollaboratorError> {
        let kind = collaborator.kind();
        let (sender, receiver) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name(format!("collaborator-{kind}"))
            .spawn(move || {
                // The receiver is gone if we already gave up on this collaborator.
                let _ = sender.send(collaborator.collect());
            });
        if let Err(source) = spawned {
            return Err(CollaboratorError::Io { kind, source });
        }

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(CollaboratorError::TimedOut { kind }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(CollaboratorError::Malformed {
                kind,
                message: "collaborator exited without a result".to_string(),
            }),
        }
    }
}
