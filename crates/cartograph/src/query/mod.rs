//! Natural-language questions over the knowledge graph.
//!
//! - [`QueryParser`]: anchored patterns for five fixed intents
//! - [`QueryPlanner`]: fallback classification for everything else
//! - [`Orchestrator`]: runs the matched operation and applies enrichment
//! - [`Explainer`]: optional preview text, never facts

mod explain;
mod orchestrator;
mod parser;
mod planner;
mod types;

pub use explain::{ExplainError, Explainer, NoopExplainer, SummaryExplainer};
pub use orchestrator::Orchestrator;
pub use parser::QueryParser;
pub use planner::{KeywordPlanner, QueryPlanner, function_candidate};
pub use types::{Intent, ParsedQuery, PlanIntent, QueryPlan, QueryResult};
