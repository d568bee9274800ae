//! Deterministic question classification.
//!
//! Each intent has a few anchored, case-insensitive patterns with one capture
//! group for the target. Intents are tried in priority order and the first
//! matching pattern wins, so "what does a.ts import" is a dependencies question
//! even though it also looks like an explain question.

use regex::Regex;
use tracing::{trace, warn};

use super::types::{Intent, ParsedQuery};

/// Confidence of patterns anchored on an explicit verb phrase.
const STRICT: f64 = 0.9;
/// Confidence of looser shorthand forms.
const LOOSE: f64 = 0.8;

/// `(intent, pattern, confidence)`, grouped by intent in priority order.
const PATTERNS: &[(Intent, &str, f64)] = &[
    (
        Intent::Dependencies,
        r"^(?:what\s+are\s+(?:the\s+)?|show\s+(?:me\s+)?(?:the\s+)?|list\s+(?:the\s+)?)?(?:dependencies|deps|imports)\s+(?:of|for|in)\s+(\S+)$",
        STRICT,
    ),
    (
        Intent::Dependencies,
        r"^what\s+does\s+(\S+)\s+(?:import|depend\s+on)$",
        STRICT,
    ),
    (Intent::Dependencies, r"^(\S+)\s+(?:dependencies|deps|imports)$", LOOSE),
    (Intent::Usage, r"^who\s+(?:calls|uses)\s+(\S+)$", STRICT),
    (Intent::Usage, r"^where\s+is\s+(\S+)\s+(?:used|called)$", STRICT),
    (
        Intent::Usage,
        r"^(?:show\s+(?:me\s+)?|find\s+)?(?:callers|usages|uses)\s+of\s+(\S+)$",
        STRICT,
    ),
    (Intent::Usage, r"^(?:usages?|callers)\s+(\S+)$", LOOSE),
    (
        Intent::History,
        r"^(?:show\s+(?:me\s+)?(?:the\s+)?|what\s+is\s+the\s+|what's\s+the\s+)?(?:history|changes|commits)\s+(?:of|for|to|on)\s+(\S+)$",
        STRICT,
    ),
    (
        Intent::History,
        r"^who\s+(?:changed|modified|touched|edited)\s+(\S+)$",
        STRICT,
    ),
    (
        Intent::History,
        r"^when\s+was\s+(\S+)\s+(?:last\s+)?(?:changed|modified|touched)$",
        STRICT,
    ),
    (
        Intent::Risks,
        r"^(?:what\s+are\s+(?:the\s+)?|show\s+(?:me\s+)?(?:the\s+)?|list\s+(?:the\s+)?)?(?:risks|issues|vulnerabilities|problems)\s+(?:in|of|for|with)\s+(\S+)$",
        STRICT,
    ),
    (Intent::Risks, r"^is\s+(\S+)\s+(?:risky|safe|dangerous)$", STRICT),
    (Intent::Risks, r"^(\S+)\s+risks$", LOOSE),
    (
        Intent::Explain,
        r"^(?:explain|describe|summarize|summarise)\s+(\S+)$",
        STRICT,
    ),
    (
        Intent::Explain,
        r"^(?:tell\s+me\s+about|what\s+is|what\s+does)\s+(\S+)(?:\s+do)?$",
        LOOSE,
    ),
];

/// Characters stripped from the end of a target.
const TRAILING_PUNCTUATION: [char; 4] = ['?', '.', '!', ','];
/// Characters stripped from both ends of a target.
const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Compiled pattern set.
#[derive(Debug, Clone)]
pub struct QueryParser {
    patterns: Vec<(Intent, Regex, f64)>,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParser {
    /// Compile the pattern set. A pattern that fails to compile is skipped.
    #[must_use]
    pub fn new() -> Self {
        let patterns = PATTERNS
            .iter()
            .filter_map(|&(intent, pattern, confidence)| {
                match Regex::new(&format!("(?i){pattern}")) {
                    Ok(re) => Some((intent, re, confidence)),
                    Err(e) => {
                        warn!(%intent, error = %e, "Skipping query pattern that failed to compile");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Classify `question`, or `None` if no pattern matches.
    #[must_use]
    pub fn parse(&self, question: &str) -> Option<ParsedQuery> {
        let question = question.trim().trim_end_matches(TRAILING_PUNCTUATION).trim_end();
        if question.is_empty() {
            return None;
        }

        for (intent, re, confidence) in &self.patterns {
            let Some(target) = re
                .captures(question)
                .and_then(|caps| caps.get(1))
                .map(|m| clean_target(m.as_str()))
            else {
                continue;
            };
            if target.is_empty() {
                continue;
            }

            trace!(%intent, query_target = target, "Question matched");
            return Some(ParsedQuery {
                intent: *intent,
                target: target.to_string(),
                confidence: *confidence,
            });
        }
        None
    }
}

fn clean_target(raw: &str) -> &str {
    raw.trim_end_matches(TRAILING_PUNCTUATION)
        .trim_matches(QUOTES)
        .trim_end_matches(TRAILING_PUNCTUATION)
}
