//! Optional prose enrichment of query results.
//!
//! An explainer sees the finished result and may return a preview string. It
//! never receives a mutable result, so it cannot change the facts.

use thiserror::Error;

use super::types::QueryResult;

/// Why an explanation could not be produced.
#[derive(Debug, Error)]
pub enum ExplainError {
    /// The backing service is not configured or not reachable
    #[error("explainer unavailable: {0}")]
    Unavailable(String),

    /// The backing service returned an error
    #[error("explanation failed: {0}")]
    Failed(String),
}

/// Produces a human-readable preview for a query result.
pub trait Explainer: Send + Sync {
    /// Explain `result`, the answer to `question`. `Ok(None)` means there is
    /// nothing to add.
    ///
    /// # Errors
    ///
    /// Returns an [`ExplainError`] when the explanation fails. Callers treat
    /// this as "no preview".
    fn explain(&self, question: &str, result: &QueryResult) -> Result<Option<String>, ExplainError>;
}

/// Explainer that never adds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExplainer;

impl Explainer for NoopExplainer {
    fn explain(
        &self,
        _question: &str,
        _result: &QueryResult,
    ) -> Result<Option<String>, ExplainError> {
        Ok(None)
    }
}

/// Deterministic one-line summary of a result, used by the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryExplainer;

impl Explainer for SummaryExplainer {
    fn explain(
        &self,
        _question: &str,
        result: &QueryResult,
    ) -> Result<Option<String>, ExplainError> {
        if let Some(error) = result.error() {
            return Ok(Some(format!("Nothing found: {error}")));
        }
        if result.files.is_empty() && result.functions.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!(
            "{} answer: {} {}, {} {}",
            result.intent,
            result.files.len(),
            plural(result.files.len(), "file", "files"),
            result.functions.len(),
            plural(result.functions.len(), "function", "functions"),
        )))
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
