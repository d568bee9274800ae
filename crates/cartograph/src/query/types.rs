//! Records passed between the parser, planner and orchestrator.

use serde::Serialize;

/// Intent recognized by the deterministic parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// What a file imports and defines
    Dependencies,
    /// Who calls a function
    Usage,
    /// Commits touching a file
    History,
    /// Risks reported against a file
    Risks,
    /// Structural summary of a file or function
    Explain,
}

impl Intent {
    /// All intents, in matching priority order.
    pub const ALL: [Self; 5] = [
        Self::Dependencies,
        Self::Usage,
        Self::History,
        Self::Risks,
        Self::Explain,
    ];

    /// Stable uppercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dependencies => "DEPENDENCIES",
            Self::Usage => "USAGE",
            Self::History => "HISTORY",
            Self::Risks => "RISKS",
            Self::Explain => "EXPLAIN",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question the parser matched. Lives only for one query evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    /// Recognized intent.
    pub intent: Intent,
    /// Target file or function, original casing.
    pub target: String,
    /// Fixed confidence of the matching pattern.
    pub confidence: f64,
}

/// Operation chosen by the fallback planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanIntent {
    /// Functions affected by changing a function
    BlastRadius,
    /// Functions ranked by call degree
    CentralFunctions,
    /// Files ranked by weighted importance
    ImportantFiles,
    /// Function lookup by name
    FindFunction,
    /// Nothing recognized; answered by the general path
    Unknown,
}

impl PlanIntent {
    /// Stable snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlastRadius => "blast_radius",
            Self::CentralFunctions => "central_functions",
            Self::ImportantFiles => "important_files",
            Self::FindFunction => "find_function",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PlanIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The planner's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPlan {
    /// Operation to run.
    pub intent: PlanIntent,
    /// Function the operation applies to, when it needs one.
    pub function_name: Option<String>,
}

impl QueryPlan {
    /// Plan with no target.
    #[must_use]
    pub fn new(intent: PlanIntent) -> Self {
        Self {
            intent,
            function_name: None,
        }
    }

    /// Plan targeting a function.
    #[must_use]
    pub fn for_function(intent: PlanIntent, name: impl Into<String>) -> Self {
        Self {
            intent,
            function_name: Some(name.into()),
        }
    }

    /// The fallback plan.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(PlanIntent::Unknown)
    }
}

/// The answer to one question.
///
/// `files`, `functions` and `metadata` are decided by graph logic alone;
/// `context_preview` is the only field enrichment may set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Parser intent (uppercase) or planner intent (snake_case).
    pub intent: String,
    /// File ids, ordered, no duplicates.
    pub files: Vec<String>,
    /// Function ids, ordered.
    pub functions: Vec<String>,
    /// Operation-specific facts; `error` when the target was not found.
    pub metadata: serde_json::Value,
    /// Optional human-readable preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_preview: Option<String>,
}

impl QueryResult {
    /// Empty result for `intent`.
    #[must_use]
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            files: Vec::new(),
            functions: Vec::new(),
            metadata: serde_json::Value::Object(serde_json::Map::new()),
            context_preview: None,
        }
    }

    /// Empty result carrying a `metadata.error` message.
    #[must_use]
    pub fn not_found(intent: impl Into<String>, message: impl Into<String>) -> Self {
        let mut result = Self::new(intent);
        result.set_meta("error", message.into());
        result
    }

    /// Set one metadata key.
    pub fn set_meta(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        if let serde_json::Value::Object(map) = &mut self.metadata {
            map.insert(key.to_string(), value.into());
        }
    }

    /// The `metadata.error` message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.metadata.get("error").and_then(serde_json::Value::as_str)
    }

    /// Append a file id unless already present.
    pub fn push_file(&mut self, file: impl Into<String>) {
        let file = file.into();
        if !self.files.contains(&file) {
            self.files.push(file);
        }
    }

    /// Cut `files` and `functions` to at most `max` entries each, recording
    /// the untruncated totals in metadata when anything was cut.
    pub fn truncate(&mut self, max: usize) {
        if self.files.len() > max {
            self.set_meta("totalFiles", self.files.len());
            self.files.truncate(max);
        }
        if self.functions.len() > max {
            self.set_meta("totalFunctions", self.functions.len());
            self.functions.truncate(max);
        }
    }
}
