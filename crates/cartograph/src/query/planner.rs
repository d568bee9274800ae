//! Fallback classification for questions the parser does not recognize.

use tracing::debug;

use super::types::{PlanIntent, QueryPlan};

/// Chooses a graph operation for a free-form question.
///
/// The default [`KeywordPlanner`] is deterministic; other implementations
/// (for example one backed by a language model) can be swapped in through
/// [`crate::query::Orchestrator::with_planner`].
pub trait QueryPlanner: Send + Sync {
    /// Plan `question`. Must return [`PlanIntent::Unknown`] rather than a plan
    /// that needs a function name it could not find.
    fn plan(&self, question: &str) -> QueryPlan;
}

const BLAST_KEYWORDS: &[&str] = &[
    "blast radius",
    "impact",
    "affect",
    "break",
    "ripple",
    "what depends on",
];
const CENTRAL_KEYWORDS: &[&str] = &[
    "central",
    "most called",
    "most used",
    "hotspot",
    "hot spot",
    "core function",
    "key function",
    "important function",
];
const IMPORTANT_FILE_KEYWORDS: &[&str] = &[
    "important file",
    "key file",
    "critical file",
    "main file",
    "core file",
    "important modules",
];
const FIND_KEYWORDS: &[&str] = &["find", "where is", "locate", "defined", "definition"];

/// Words after which the next token names the target function.
const INTRODUCERS: &[&str] = &["function", "method", "fn", "func"];
/// Words after which the next token is a weak target candidate.
const WEAK_INTRODUCERS: &[&str] = &["of", "for", "change", "changing", "modify", "modifying", "is"];
/// Tokens never taken as a function name.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "i", "if", "is", "it", "of", "for", "to", "in", "on", "what", "where",
    "who", "which", "how", "function", "method", "file", "files", "functions", "this", "that",
    "me", "my", "do", "does", "would", "will", "be", "are", "and", "or",
];

/// Keyword planner with heuristic function-name extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordPlanner;

impl QueryPlanner for KeywordPlanner {
    fn plan(&self, question: &str) -> QueryPlan {
        let lower = question.to_lowercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        let plan = if contains_any(BLAST_KEYWORDS) {
            function_candidate(question).map_or_else(QueryPlan::unknown, |name| {
                QueryPlan::for_function(PlanIntent::BlastRadius, name)
            })
        } else if contains_any(CENTRAL_KEYWORDS) {
            QueryPlan::new(PlanIntent::CentralFunctions)
        } else if contains_any(IMPORTANT_FILE_KEYWORDS)
            || (lower.contains("file") && (lower.contains("important") || lower.contains("top")))
        {
            QueryPlan::new(PlanIntent::ImportantFiles)
        } else if contains_any(FIND_KEYWORDS) {
            function_candidate(question).map_or_else(QueryPlan::unknown, |name| {
                QueryPlan::for_function(PlanIntent::FindFunction, name)
            })
        } else {
            QueryPlan::unknown()
        };

        debug!(intent = %plan.intent, function = ?plan.function_name, "Question planned");
        plan
    }
}

/// Best identifier-like token in `question`, if any.
///
/// Scores, highest first: a token written with `()`, a token after
/// "function"/"method", a token containing `_` or camelCase, a token after a
/// weak introducer such as "of". Earlier tokens win ties.
#[must_use]
pub fn function_candidate(question: &str) -> Option<String> {
    let words: Vec<&str> = question.split_whitespace().collect();
    let mut best: Option<(u8, &str)> = None;

    for (i, raw) in words.iter().enumerate() {
        let token =
            raw.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '?' | '!' | ',' | ';'));
        let token = token.trim_end_matches('.');
        let (token, called) = match token.strip_suffix("()") {
            Some(stripped) => (stripped, true),
            None => (token, false),
        };
        if !is_identifier(token) || STOPWORDS.contains(&token.to_lowercase().as_str()) {
            continue;
        }

        let previous = i
            .checked_sub(1)
            .map(|p| words[p].to_lowercase())
            .unwrap_or_default();
        let score = if called {
            4
        } else if INTRODUCERS.contains(&previous.as_str()) {
            3
        } else if token.contains('_') || is_camel_case(token) || token.contains("::") {
            2
        } else if WEAK_INTRODUCERS.contains(&previous.as_str()) {
            1
        } else {
            0
        };

        if score > 0 && best.is_none_or(|(top, _)| score > top) {
            best = Some((score, token));
        }
    }

    best.map(|(_, token)| token.to_string())
}

/// `name`, `Type.method` or `module::name`, made of identifier characters.
fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token
            .split("::")
            .flat_map(|part| part.split('.'))
            .all(|segment| {
                let mut chars = segment.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            })
}

fn is_camel_case(token: &str) -> bool {
    let mut seen_lower = false;
    for c in token.chars() {
        if c.is_lowercase() {
            seen_lower = true;
        } else if c.is_uppercase() && seen_lower {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::blast_camel(
        "what breaks if I change computeTotal",
        PlanIntent::BlastRadius,
        Some("computeTotal")
    )]
    #[case::blast_parens(
        "impact of changing render()",
        PlanIntent::BlastRadius,
        Some("render")
    )]
    #[case::blast_radius_of("blast radius of parse", PlanIntent::BlastRadius, Some("parse"))]
    #[case::blast_without_name("what is the impact", PlanIntent::Unknown, None)]
    #[case::central("which functions are most called", PlanIntent::CentralFunctions, None)]
    #[case::important("show the most important files", PlanIntent::ImportantFiles, None)]
    #[case::find_method(
        "find the method load_config",
        PlanIntent::FindFunction,
        Some("load_config")
    )]
    #[case::find_without_name("find it", PlanIntent::Unknown, None)]
    #[case::nothing("how big is this codebase", PlanIntent::Unknown, None)]
    fn plans_questions(
        #[case] question: &str,
        #[case] intent: PlanIntent,
        #[case] function: Option<&str>,
    ) {
        let plan = KeywordPlanner.plan(question);

        assert_eq!(plan.intent, intent);
        assert_eq!(plan.function_name.as_deref(), function);
    }

    #[rstest]
    #[case::parens_beat_camel("does fooBar call baz()", Some("baz"))]
    #[case::after_function("the function run", Some("run"))]
    #[case::qualified("callers of Cart::total", Some("Cart::total"))]
    #[case::plain_words("hello there", None)]
    #[case::path_is_not_identifier("see src/app.ts", None)]
    fn picks_candidates(#[case] question: &str, #[case] expected: Option<&str>) {
        assert_eq!(function_candidate(question).as_deref(), expected);
    }
}
