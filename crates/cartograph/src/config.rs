//! Workspace configuration, read from `.cartograph/config.yaml`.
//!
//! Every section and field is optional; anything left out takes its default.
//!
//! ```yaml
//! build:
//!   batch_size: 256
//! snapshot:
//!   enabled: true
//!   directory: .cartograph/snapshots
//! query:
//!   max_results: 50
//! importance:
//!   define_weight: 1.0
//!   importer_weight: 2.0
//! collaborators:
//!   timeout_secs: 120
//!   findings_dir: .cartograph/findings
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::ImportanceWeights;
use crate::builder::DEFAULT_BATCH_SIZE;
use crate::error::{Error, Result};

/// Name of the per-workspace Cartograph directory.
pub const CARTOGRAPH_DIR_NAME: &str = ".cartograph";

/// Name of the configuration file inside [`CARTOGRAPH_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default cap on result list lengths.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Default per-collaborator deadline, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartographConfig {
    /// Graph build settings
    pub build: BuildConfig,
    /// Snapshot output settings
    pub snapshot: SnapshotConfig,
    /// Query settings
    pub query: QueryConfig,
    /// File-importance weights
    pub importance: ImportanceWeights,
    /// Collaborator settings
    pub collaborators: CollaboratorConfig,
}

/// Graph build settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Extraction records processed between yields.
    pub batch_size: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Whether `build` writes a snapshot.
    pub enabled: bool,
    /// Snapshot directory, relative to the workspace unless absolute.
    pub directory: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: Path::new(CARTOGRAPH_DIR_NAME).join("snapshots"),
        }
    }
}

/// Query settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum entries in each result list.
    pub max_results: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Collaborator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Seconds a collaborator may run before its finding is abandoned.
    pub timeout_secs: u64,
    /// Directory holding `<kind>.json` finding files, relative to the workspace
    /// unless absolute.
    pub findings_dir: PathBuf,
}

impl CollaboratorConfig {
    /// The deadline as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            findings_dir: Path::new(CARTOGRAPH_DIR_NAME).join("findings"),
        }
    }
}

impl CartographConfig {
    /// Path of the configuration file for `workspace`.
    #[must_use]
    pub fn path_in(workspace: &Path) -> PathBuf {
        workspace.join(CARTOGRAPH_DIR_NAME).join(CONFIG_FILE_NAME)
    }

    /// Load the configuration for `workspace`, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be read, and
    /// [`Error::Config`] if it is not valid YAML or fails validation.
    pub fn load_for(workspace: &Path) -> Result<Self> {
        let path = Self::path_in(workspace);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "Loading configuration");
                Self::from_yaml(&content)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate a YAML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed YAML or invalid values.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails and [`Error::Io`] if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.build.batch_size == 0 {
            return Err(Error::Config("build.batch_size must be positive".to_string()));
        }
        if self.query.max_results == 0 {
            return Err(Error::Config("query.max_results must be positive".to_string()));
        }
        for (name, weight) in [
            ("define_weight", self.importance.define_weight),
            ("importer_weight", self.importance.importer_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Config(format!(
                    "importance.{name} must be a finite, non-negative number"
                )));
            }
        }
        Ok(())
    }

    /// Snapshot directory resolved against `workspace`.
    #[must_use]
    pub fn snapshot_dir(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.snapshot.directory)
    }

    /// Findings directory resolved against `workspace`.
    #[must_use]
    pub fn findings_dir(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.collaborators.findings_dir)
    }
}
