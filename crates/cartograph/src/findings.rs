//! Findings handed over by external collaborators.
//!
//! Each collaborator (workspace scanner, extractor, history miner, risk
//! scanner) contributes at most one finding per analysis run. Findings are a
//! closed set: every [`CollaboratorKind`] has exactly one payload type, so
//! consumers match on [`Finding`] instead of casting untyped payloads.
//!
//! The store keeps one finding per collaborator; a later finding from the same
//! collaborator replaces the earlier one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity of an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorKind {
    /// Workspace file/folder enumeration
    Structure,
    /// Function extraction
    Extraction,
    /// Import resolution
    Dependencies,
    /// Version-control history mining
    History,
    /// Risk scanning
    Risks,
}

impl CollaboratorKind {
    /// All collaborator kinds, in build order.
    pub const ALL: [Self; 5] = [
        Self::Structure,
        Self::Extraction,
        Self::Dependencies,
        Self::History,
        Self::Risks,
    ];

    /// Stable lowercase name, also used as the finding file stem.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Extraction => "extraction",
            Self::Dependencies => "dependencies",
            Self::History => "history",
            Self::Risks => "risks",
        }
    }
}

impl std::fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope around one collaborator's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFinding<T> {
    /// Name of the producing collaborator.
    pub source: String,
    /// Production time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Typed payload.
    pub data: T,
}

impl<T> AgentFinding<T> {
    /// Wrap a payload stamped with the current time.
    pub fn now(source: impl Into<String>, data: T) -> Self {
        Self {
            source: source.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            data,
        }
    }
}

/// Files and folders discovered in the workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureData {
    /// Folder ids.
    pub folders: Vec<String>,
    /// File ids.
    pub files: Vec<String>,
}

/// One function-like unit reported by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFunction {
    /// Unique function id (file path plus disambiguated name).
    pub id: String,
    /// Function name.
    pub name: String,
    /// Id of the defining file.
    pub file: String,
    /// 1-based start line.
    #[serde(default)]
    pub start_line: u32,
    /// Callee names, unresolved.
    #[serde(default)]
    pub calls: Vec<String>,
}

/// Output of function extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionData {
    /// Extracted functions, in extraction order.
    pub functions: Vec<ExtractedFunction>,
}

/// An import edge between two workspace files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyPair {
    /// Importing file id.
    pub from: String,
    /// Imported file id.
    pub to: String,
}

/// Output of import resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyData {
    /// Resolved workspace-internal imports.
    pub dependencies: Vec<DependencyPair>,
}

/// One commit touching a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// File path the commit touched.
    pub file: String,
    /// Commit hash.
    pub commit: String,
    /// Commit author.
    #[serde(default)]
    pub author: String,
    /// Commit date as reported by the history miner.
    #[serde(default)]
    pub date: String,
    /// Commit subject line.
    #[serde(default)]
    pub message: String,
}

/// Output of history mining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryData {
    /// Commits, newest first.
    pub entries: Vec<HistoryEntry>,
}

/// Severity of a reported risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Low,
    /// Worth a look
    Medium,
    /// Likely problem
    High,
    /// Must fix
    Critical,
}

/// One risk reported against a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    /// File the risk was found in.
    pub file: String,
    /// Risk category (e.g. "secret", "complexity").
    pub category: String,
    /// How serious the risk is.
    pub severity: Severity,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Line, if the scanner reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Output of risk scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskData {
    /// Reported risks.
    pub risks: Vec<RiskEntry>,
}

/// A finding from one collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// Workspace enumeration
    Structure(AgentFinding<StructureData>),
    /// Function extraction
    Extraction(AgentFinding<ExtractionData>),
    /// Import resolution
    Dependencies(AgentFinding<DependencyData>),
    /// History mining
    History(AgentFinding<HistoryData>),
    /// Risk scanning
    Risks(AgentFinding<RiskData>),
}

impl Finding {
    /// The collaborator this finding belongs to.
    #[must_use]
    pub fn kind(&self) -> CollaboratorKind {
        match self {
            Self::Structure(_) => CollaboratorKind::Structure,
            Self::Extraction(_) => CollaboratorKind::Extraction,
            Self::Dependencies(_) => CollaboratorKind::Dependencies,
            Self::History(_) => CollaboratorKind::History,
            Self::Risks(_) => CollaboratorKind::Risks,
        }
    }

    /// Decode a finding envelope of the given kind from JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoding error if `json` does not match the payload type.
    pub fn from_json(kind: CollaboratorKind, json: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            CollaboratorKind::Structure => Self::Structure(serde_json::from_str(json)?),
            CollaboratorKind::Extraction => Self::Extraction(serde_json::from_str(json)?),
            CollaboratorKind::Dependencies => Self::Dependencies(serde_json::from_str(json)?),
            CollaboratorKind::History => Self::History(serde_json::from_str(json)?),
            CollaboratorKind::Risks => Self::Risks(serde_json::from_str(json)?),
        })
    }
}

/// One finding per collaborator, last write wins.
#[derive(Debug, Clone, Default)]
pub struct FindingsStore {
    findings: BTreeMap<CollaboratorKind, Finding>,
}

impl FindingsStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding, replacing any earlier finding from the same collaborator.
    pub fn insert(&mut self, finding: Finding) {
        self.findings.insert(finding.kind(), finding);
    }

    /// Whether a collaborator has contributed.
    #[must_use]
    pub fn contains(&self, kind: CollaboratorKind) -> bool {
        self.findings.contains_key(&kind)
    }

    /// Collaborators with no finding.
    #[must_use]
    pub fn missing(&self) -> Vec<CollaboratorKind> {
        CollaboratorKind::ALL
            .into_iter()
            .filter(|kind| !self.contains(*kind))
            .collect()
    }

    /// Workspace enumeration, if present.
    #[must_use]
    pub fn structure(&self) -> Option<&AgentFinding<StructureData>> {
        match self.findings.get(&CollaboratorKind::Structure) {
            Some(Finding::Structure(finding)) => Some(finding),
            _ => None,
        }
    }

    /// Function extraction, if present.
    #[must_use]
    pub fn extraction(&self) -> Option<&AgentFinding<ExtractionData>> {
        match self.findings.get(&CollaboratorKind::Extraction) {
            Some(Finding::Extraction(finding)) => Some(finding),
            _ => None,
        }
    }

    /// Import resolution, if present.
    #[must_use]
    pub fn dependencies(&self) -> Option<&AgentFinding<DependencyData>> {
        match self.findings.get(&CollaboratorKind::Dependencies) {
            Some(Finding::Dependencies(finding)) => Some(finding),
            _ => None,
        }
    }

    /// History mining, if present.
    #[must_use]
    pub fn history(&self) -> Option<&AgentFinding<HistoryData>> {
        match self.findings.get(&CollaboratorKind::History) {
            Some(Finding::History(finding)) => Some(finding),
            _ => None,
        }
    }

    /// Risk scanning, if present.
    #[must_use]
    pub fn risks(&self) -> Option<&AgentFinding<RiskData>> {
        match self.findings.get(&CollaboratorKind::Risks) {
            Some(Finding::Risks(finding)) => Some(finding),
            _ => None,
        }
    }

    /// History entries for a file id. `None` when no history finding exists.
    #[must_use]
    pub fn history_for(&self, file_id: &str) -> Option<Vec<&HistoryEntry>> {
        self.history().map(|finding| {
            finding
                .data
                .entries
                .iter()
                .filter(|entry| same_file(file_id, &entry.file))
                .collect()
        })
    }

    /// Risks for a file id, most severe first. `None` when no risk finding exists.
    #[must_use]
    pub fn risks_for(&self, file_id: &str) -> Option<Vec<&RiskEntry>> {
        self.risks().map(|finding| {
            let mut risks: Vec<&RiskEntry> = finding
                .data
                .risks
                .iter()
                .filter(|risk| same_file(file_id, &risk.file))
                .collect();
            risks.sort_by(|a, b| b.severity.cmp(&a.severity));
            risks
        })
    }
}

/// Collaborators may report paths relative to the workspace while file ids are
/// full paths; treat a relative path as matching the id it is a suffix of.
fn same_file(file_id: &str, reported: &str) -> bool {
    let reported = reported.trim_start_matches("./");
    file_id == reported
        || file_id
            .strip_suffix(reported)
            .is_some_and(|prefix| prefix.ends_with('/'))
}
