//! Error types for Cartograph operations.
//!
//! Errors are split the same way the build pipeline is:
//!
//! - **`Error`**: infrastructure failures that halt an operation (I/O, malformed
//!   config, no workspace enumeration to build from)
//! - **`CollaboratorError`**: a single collaborator failed to produce its
//!   finding; collected and logged, never fatal to the build
//!
//! ## Error Philosophy
//!
//! Cartograph reports facts on a best-effort basis:
//! - A missing or failed collaborator degrades its contribution to "absent"
//! - Unresolved call targets and import endpoints are dropped, not reported
//! - Queries for unknown files or functions return empty results with a
//!   `metadata.error` string rather than an `Err`
//!
//! The only hard failure of a build is [`Error::NoWorkspace`].

use thiserror::Error;

use crate::findings::CollaboratorKind;

/// Result type for Cartograph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Cartograph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// No file/folder enumeration was available, so there is nothing to analyze
    #[error("no workspace to analyze: the {0} finding is missing")]
    NoWorkspace(CollaboratorKind),
}

/// Failure of one external collaborator while producing its finding.
///
/// These never abort a build; the collaborator's finding is simply absent.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator's input could not be read
    #[error("{kind} collaborator I/O failure: {source}")]
    Io {
        /// Which collaborator failed.
        kind: CollaboratorKind,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The collaborator produced output that could not be decoded
    #[error("{kind} collaborator produced malformed output: {message}")]
    Malformed {
        /// Which collaborator failed.
        kind: CollaboratorKind,
        /// Human-readable description of what was wrong.
        message: String,
    },

    /// The collaborator ran past its deadline and was abandoned
    #[error("{kind} collaborator timed out")]
    TimedOut {
        /// Which collaborator timed out.
        kind: CollaboratorKind,
    },
}

impl CollaboratorError {
    /// The collaborator this error belongs to.
    #[must_use]
    pub fn kind(&self) -> CollaboratorKind {
        match self {
            Self::Io { kind, .. } | Self::Malformed { kind, .. } | Self::TimedOut { kind } => {
                *kind
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_workspace_names_the_missing_finding() {
        let error = Error::NoWorkspace(CollaboratorKind::Structure);

        let display = error.to_string();
        assert!(display.contains("structure"), "got: {display}");
    }

    #[test]
    fn collaborator_error_reports_its_kind() {
        let error = CollaboratorError::TimedOut {
            kind: CollaboratorKind::History,
        };

        assert_eq!(error.kind(), CollaboratorKind::History);
        assert_eq!(error.to_string(), "history collaborator timed out");
    }

    #[test]
    fn collaborator_io_error_keeps_source() {
        let error = CollaboratorError::Io {
            kind: CollaboratorKind::Extraction,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };

        assert!(std::error::Error::source(&error).is_some());
    }
}
