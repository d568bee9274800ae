//! Turns a question into a [`QueryResult`].
//!
//! ```text
//! question ─► parser ──hit──► intent handler ─┐
//!               │                             ├─► truncate ─► explainer ─► result
//!               └─miss─► planner ─► operation ┘                (preview only)
//! ```
//!
//! Facts (`files`, `functions`, `metadata`) are fixed before the explainer
//! runs. The explainer only sees a shared reference and its output lands in
//! `context_preview`; if it fails the result is returned without a preview.

use std::collections::HashSet;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::analysis::{
    ImportanceWeights, callees_of, callers_of, defining_file, file_importance,
    find_function_by_name, function_blast_radius, function_centrality, functions_defined_in,
    import_dependencies, import_dependents, resolve_file,
};
use crate::config::CartographConfig;
use crate::graph::{KnowledgeGraph, NodeType};
use crate::session::AnalysisContext;

use super::explain::{Explainer, NoopExplainer};
use super::parser::QueryParser;
use super::planner::{KeywordPlanner, QueryPlanner};
use super::types::{Intent, ParsedQuery, PlanIntent, QueryPlan, QueryResult};

/// Answers questions against an [`AnalysisContext`]. Holds no per-query state.
pub struct Orchestrator {
    parser: QueryParser,
    planner: Box<dyn QueryPlanner>,
    explainer: Box<dyn Explainer>,
    max_results: usize,
    weights: ImportanceWeights,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("max_results", &self.max_results)
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator with the keyword planner and no explainer.
    #[must_use]
    pub fn new(config: &CartographConfig) -> Self {
        Self {
            parser: QueryParser::new(),
            planner: Box::new(KeywordPlanner),
            explainer: Box::new(NoopExplainer),
            max_results: config.query.max_results.max(1),
            weights: config.importance,
        }
    }

    /// Replace the fallback planner.
    #[must_use]
    pub fn with_planner(mut self, planner: impl QueryPlanner + 'static) -> Self {
        self.planner = Box::new(planner);
        self
    }

    /// Replace the explainer.
    #[must_use]
    pub fn with_explainer(mut self, explainer: impl Explainer + 'static) -> Self {
        self.explainer = Box::new(explainer);
        self
    }

    /// Answer `question` against `context`.
    #[must_use]
    pub fn run_query(&self, context: &AnalysisContext, question: &str) -> QueryResult {
        let mut result = match self.parser.parse(question) {
            Some(parsed) => {
                debug!(intent = %parsed.intent, query_target = %parsed.target, "Parser matched");
                self.handle_parsed(context, &parsed)
            }
            None => {
                let plan = self.planner.plan(question);
                self.handle_plan(&context.graph, &plan)
            }
        };
        result.truncate(self.max_results);

        match self.explainer.explain(question, &result) {
            Ok(preview) => result.context_preview = preview,
            Err(e) => warn!(error = %e, "Explainer failed, returning result without preview"),
        }
        result
    }

    fn handle_parsed(&self, context: &AnalysisContext, parsed: &ParsedQuery) -> QueryResult {
        let graph = &context.graph;
        let target = parsed.target.as_str();
        let intent = parsed.intent.as_str();

        let mut result = match parsed.intent {
            Intent::Dependencies => match resolve_file(graph, target) {
                Some(file) => dependencies(graph, file),
                None => QueryResult::not_found(intent, format!("file not found: {target}")),
            },
            Intent::Usage => usage(graph, target),
            Intent::History => match resolve_file(graph, target) {
                Some(file) => history(context, file),
                None => QueryResult::not_found(intent, format!("file not found: {target}")),
            },
            Intent::Risks => match resolve_file(graph, target) {
                Some(file) => risks(context, file),
                None => QueryResult::not_found(intent, format!("file not found: {target}")),
            },
            Intent::Explain => explain(graph, target),
        };
        result.set_meta("confidence", parsed.confidence);
        result
    }

    fn handle_plan(&self, graph: &KnowledgeGraph, plan: &QueryPlan) -> QueryResult {
        let intent = plan.intent.as_str();
        match (plan.intent, plan.function_name.as_deref()) {
            (PlanIntent::BlastRadius, Some(name)) => blast_radius(graph, name),
            (PlanIntent::FindFunction, Some(name)) => find_function(graph, name),
            (PlanIntent::CentralFunctions, _) => self.central_functions(graph),
            (PlanIntent::ImportantFiles, _) => self.important_files(graph),
            (PlanIntent::BlastRadius | PlanIntent::FindFunction, None) => {
                QueryResult::not_found(intent, "no function name in question")
            }
            (PlanIntent::Unknown, _) => general(graph),
        }
    }

    fn central_functions(&self, graph: &KnowledgeGraph) -> QueryResult {
        let mut result = QueryResult::new(PlanIntent::CentralFunctions.as_str());
        let ranking = function_centrality(graph);
        for entry in &ranking {
            result.functions.push(entry.id.clone());
            if !entry.file.is_empty() {
                result.push_file(entry.file.as_str());
            }
        }
        let top: Vec<_> = ranking.iter().take(self.max_results).collect();
        result.set_meta("ranking", json!(top));
        result
    }

    fn important_files(&self, graph: &KnowledgeGraph) -> QueryResult {
        let mut result = QueryResult::new(PlanIntent::ImportantFiles.as_str());
        let ranking = file_importance(graph, self.weights);
        for entry in &ranking {
            result.push_file(entry.id.as_str());
        }
        let top: Vec<_> = ranking.iter().take(self.max_results).collect();
        result.set_meta("ranking", json!(top));
        result
    }
}

fn dependencies(graph: &KnowledgeGraph, file: &str) -> QueryResult {
    let mut result = QueryResult::new(Intent::Dependencies.as_str());
    for import in import_dependencies(graph, file) {
        result.push_file(import);
    }
    result.functions = owned(functions_defined_in(graph, file));
    result.set_meta("file", file);
    result.set_meta("importCount", result.files.len());
    result.set_meta("functionCount", result.functions.len());
    result
}

fn usage(graph: &KnowledgeGraph, target: &str) -> QueryResult {
    let intent = Intent::Usage.as_str();
    let matches = function_ids(graph, target);
    let file = resolve_file(graph, target);
    if matches.is_empty() && file.is_none() {
        return QueryResult::not_found(intent, format!("no function or file named {target}"));
    }

    let mut result = QueryResult::new(intent);
    let mut seen = HashSet::new();
    for id in &matches {
        for caller in callers_of(graph, id) {
            if seen.insert(caller) {
                result.functions.push(caller.to_string());
                if let Some(caller_file) = defining_file(graph, caller) {
                    result.push_file(caller_file);
                }
            }
        }
    }
    if let Some(file) = file {
        for importer in import_dependents(graph, file) {
            result.push_file(importer);
        }
        result.set_meta("file", file);
    }
    result.set_meta("matches", json!(matches));
    result.set_meta("callerCount", result.functions.len());
    result
}

fn history(context: &AnalysisContext, file: &str) -> QueryResult {
    let mut result = QueryResult::new(Intent::History.as_str());
    result.push_file(file);
    result.set_meta("file", file);
    match context.findings.history_for(file) {
        Some(entries) => {
            result.set_meta("commitCount", entries.len());
            result.set_meta("commits", json!(entries));
        }
        None => {
            debug!(file, "No history finding available");
            result.set_meta("available", false);
        }
    }
    result
}

fn risks(context: &AnalysisContext, file: &str) -> QueryResult {
    let mut result = QueryResult::new(Intent::Risks.as_str());
    result.push_file(file);
    result.set_meta("file", file);
    match context.findings.risks_for(file) {
        Some(risks) => {
            result.set_meta("riskCount", risks.len());
            result.set_meta("risks", json!(risks));
        }
        None => {
            debug!(file, "No risk finding available");
            result.set_meta("available", false);
        }
    }
    result
}

fn explain(graph: &KnowledgeGraph, target: &str) -> QueryResult {
    let intent = Intent::Explain.as_str();

    if let Some(function) = function_ids(graph, target).into_iter().next() {
        let mut result = QueryResult::new(intent);
        let callers = callers_of(graph, &function);
        let callees = callees_of(graph, &function);
        let file = defining_file(graph, &function);
        if let Some(file) = file {
            result.push_file(file);
        }
        result.functions.push(function.clone());
        result.set_meta("kind", NodeType::Function.as_str());
        result.set_meta("id", function.as_str());
        result.set_meta("file", file.map_or(Value::Null, Value::from));
        result.set_meta("callers", json!(callers));
        result.set_meta("callees", json!(callees));
        return result;
    }

    let Some(file) = resolve_file(graph, target) else {
        return QueryResult::not_found(intent, format!("no function or file named {target}"));
    };
    let defines = functions_defined_in(graph, file);
    let imports = import_dependencies(graph, file);
    let importers = import_dependents(graph, file);

    let mut result = QueryResult::new(intent);
    result.push_file(file);
    for import in &imports {
        result.push_file(*import);
    }
    result.functions = owned(defines.clone());
    result.set_meta("kind", NodeType::File.as_str());
    result.set_meta("id", file);
    result.set_meta("defines", json!(defines));
    result.set_meta("imports", json!(imports));
    result.set_meta("importers", json!(importers));
    result
}

fn blast_radius(graph: &KnowledgeGraph, name: &str) -> QueryResult {
    let intent = PlanIntent::BlastRadius.as_str();
    let matches = function_ids(graph, name);
    let Some(function) = matches.first() else {
        return QueryResult::not_found(intent, format!("function not found: {name}"));
    };

    let radius = function_blast_radius(graph, function);
    let mut result = QueryResult::new(intent);
    for file in &radius.affected_files {
        result.push_file(file.as_str());
    }
    result.set_meta("function", function.as_str());
    result.set_meta("depth", radius.depth);
    result.set_meta("affectedCount", radius.affected_functions.len());
    if matches.len() > 1 {
        result.set_meta("otherMatches", json!(matches[1..]));
    }
    result.functions = radius.affected_functions;
    result
}

fn find_function(graph: &KnowledgeGraph, name: &str) -> QueryResult {
    let intent = PlanIntent::FindFunction.as_str();
    let nodes = find_function_by_name(graph, name);
    if nodes.is_empty() {
        return QueryResult::not_found(intent, format!("function not found: {name}"));
    }

    let mut result = QueryResult::new(intent);
    let mut locations = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let Some(data) = node.as_function() {
            result.push_file(data.file.as_str());
            locations.push(json!({
                "id": node.id,
                "file": data.file,
                "startLine": data.start_line,
            }));
        }
        result.functions.push(node.id.clone());
    }
    result.set_meta("locations", Value::Array(locations));
    result
}

fn general(graph: &KnowledgeGraph) -> QueryResult {
    let mut result = QueryResult::new(PlanIntent::Unknown.as_str());
    result.set_meta("stats", json!(graph.stats()));
    result.set_meta(
        "hint",
        "try: dependencies of <file>, who calls <function>, history of <file>, \
         risks in <file>, explain <file or function>",
    );
    result
}

/// Function ids for `target`: the exact id if it is a function, otherwise
/// every function with that name.
fn function_ids(graph: &KnowledgeGraph, target: &str) -> Vec<String> {
    if graph
        .get_node(target)
        .is_some_and(|node| node.node_type() == NodeType::Function)
    {
        return vec![target.to_string()];
    }
    find_function_by_name(graph, target)
        .into_iter()
        .map(|node| node.id.clone())
        .collect()
}

fn owned(ids: Vec<&str>) -> Vec<String> {
    ids.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{AgentFinding, Finding, FindingsStore, HistoryData, HistoryEntry};
    use crate::graph::{Edge, EdgeType, Node};
    use crate::query::explain::ExplainError;

    /// ```text
    /// app.ts ──imports──► cart.ts
    /// app.ts::main ──calls──► cart.ts::computeTotal ──calls──► cart.ts::add_tax
    /// ```
    fn context() -> AnalysisContext {
        let mut graph = KnowledgeGraph::new();
        graph.add_node(Node::file("/r/app.ts"));
        graph.add_node(Node::file("/r/cart.ts"));
        graph.add_node(Node::function("/r/app.ts::main", "main", "/r/app.ts", 1));
        graph.add_node(Node::function(
            "/r/cart.ts::computeTotal",
            "computeTotal",
            "/r/cart.ts",
            3,
        ));
        graph.add_node(Node::function("/r/cart.ts::add_tax", "add_tax", "/r/cart.ts", 9));
        for (file, function) in [
            ("/r/app.ts", "/r/app.ts::main"),
            ("/r/cart.ts", "/r/cart.ts::computeTotal"),
            ("/r/cart.ts", "/r/cart.ts::add_tax"),
        ] {
            graph.add_edge(Edge::new(file, function, EdgeType::Defines));
        }
        graph.add_edge(Edge::new("/r/app.ts", "/r/cart.ts", EdgeType::Imports));
        // callee -> caller
        graph.add_edge(Edge::new(
            "/r/cart.ts::computeTotal",
            "/r/app.ts::main",
            EdgeType::Calls,
        ));
        graph.add_edge(Edge::new(
            "/r/cart.ts::add_tax",
            "/r/cart.ts::computeTotal",
            EdgeType::Calls,
        ));
        AnalysisContext::new(graph, FindingsStore::new())
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(&CartographConfig::default())
    }

    struct Failing;

    impl Explainer for Failing {
        fn explain(&self, _: &str, _: &QueryResult) -> Result<Option<String>, ExplainError> {
            Err(ExplainError::Unavailable("offline".into()))
        }
    }

    struct Fixed;

    impl Explainer for Fixed {
        fn explain(&self, _: &str, _: &QueryResult) -> Result<Option<String>, ExplainError> {
            Ok(Some("a preview".into()))
        }
    }

    #[test]
    fn dependencies_lists_imports_and_definitions() {
        let result = orchestrator().run_query(&context(), "dependencies of app.ts");

        assert_eq!(result.intent, "DEPENDENCIES");
        assert_eq!(result.files, ["/r/cart.ts"]);
        assert_eq!(result.functions, ["/r/app.ts::main"]);
    }

    #[test]
    fn usage_lists_direct_callers() {
        let result = orchestrator().run_query(&context(), "who calls computeTotal");

        assert_eq!(result.intent, "USAGE");
        assert_eq!(result.functions, ["/r/app.ts::main"]);
        assert_eq!(result.files, ["/r/app.ts"]);
    }

    #[test]
    fn usage_of_file_lists_importers() {
        let result = orchestrator().run_query(&context(), "who uses cart.ts");

        assert_eq!(result.files, ["/r/app.ts"]);
        assert!(result.functions.is_empty());
    }

    #[test]
    fn unknown_target_sets_error() {
        let result = orchestrator().run_query(&context(), "dependencies of ghost.ts");

        assert!(result.files.is_empty());
        assert!(result.functions.is_empty());
        assert_eq!(result.error(), Some("file not found: ghost.ts"));
    }

    #[test]
    fn history_without_finding_is_marked_unavailable() {
        let result = orchestrator().run_query(&context(), "history of cart.ts");

        assert_eq!(result.files, ["/r/cart.ts"]);
        assert_eq!(result.metadata["available"], false);
        assert!(result.error().is_none());
    }

    #[test]
    fn history_lists_commits_for_the_file() {
        let mut context = context();
        let entry = |file: &str, commit: &str| HistoryEntry {
            file: file.to_string(),
            commit: commit.to_string(),
            author: "dev".to_string(),
            date: "2024-05-01".to_string(),
            message: format!("touch {file}"),
        };
        context.findings.insert(Finding::History(AgentFinding::now(
            "git",
            HistoryData {
                entries: vec![
                    entry("cart.ts", "c1"),
                    entry("app.ts", "a1"),
                    entry("/r/cart.ts", "c2"),
                ],
            },
        )));

        let result = orchestrator().run_query(&context, "history of cart.ts");

        assert_eq!(result.intent, "HISTORY");
        assert_eq!(result.files, ["/r/cart.ts"]);
        assert!(result.functions.is_empty());
        assert_eq!(result.metadata["commitCount"], 2);
        assert_eq!(result.metadata["commits"][0]["commit"], "c1");
        assert_eq!(result.metadata["commits"][1]["commit"], "c2");
        assert!(result.metadata.get("available").is_none());
    }

    #[test]
    fn explain_file_reports_structure() {
        let result = orchestrator().run_query(&context(), "explain cart.ts");

        assert_eq!(result.intent, "EXPLAIN");
        assert_eq!(result.files, ["/r/cart.ts"]);
        assert_eq!(
            result.functions,
            ["/r/cart.ts::computeTotal", "/r/cart.ts::add_tax"]
        );
        assert_eq!(result.metadata["kind"], "file");
        assert_eq!(
            result.metadata["defines"],
            json!(["/r/cart.ts::computeTotal", "/r/cart.ts::add_tax"])
        );
        assert_eq!(result.metadata["imports"], json!([]));
        assert_eq!(result.metadata["importers"], json!(["/r/app.ts"]));
    }

    #[test]
    fn explain_function_reports_neighbors() {
        let result = orchestrator().run_query(&context(), "explain computeTotal");

        assert_eq!(result.metadata["kind"], "function");
        assert_eq!(result.metadata["callers"], json!(["/r/app.ts::main"]));
        assert_eq!(result.metadata["callees"], json!(["/r/cart.ts::add_tax"]));
    }

    #[test]
    fn planner_handles_blast_radius() {
        let result = orchestrator().run_query(&context(), "what breaks if add_tax changes");

        assert_eq!(result.intent, "blast_radius");
        assert_eq!(
            result.functions,
            ["/r/cart.ts::computeTotal", "/r/app.ts::main"]
        );
        assert_eq!(result.files, ["/r/cart.ts", "/r/app.ts"]);
        assert_eq!(result.metadata["depth"], 2);
    }

    #[test]
    fn planner_ranks_central_functions() {
        let result = orchestrator().run_query(&context(), "most called functions");

        assert_eq!(result.intent, "central_functions");
        assert_eq!(result.functions[0], "/r/cart.ts::computeTotal");
    }

    #[test]
    fn planner_ranks_important_files() {
        let result = orchestrator().run_query(&context(), "show the most important files");

        assert_eq!(result.intent, "important_files");
        assert_eq!(result.files, ["/r/cart.ts", "/r/app.ts"]);
        assert!(result.functions.is_empty());
        assert_eq!(result.metadata["ranking"][0]["id"], "/r/cart.ts");
        assert_eq!(result.metadata["ranking"][0]["functionCount"], 2);
        assert_eq!(result.metadata["ranking"][0]["importerCount"], 1);
        assert_eq!(result.metadata["ranking"][0]["importance"], 4.0);
    }

    #[test]
    fn planner_finds_function_locations() {
        let result =
            orchestrator().run_query(&context(), "where is the function add_tax defined");

        assert_eq!(result.intent, "find_function");
        assert_eq!(result.files, ["/r/cart.ts"]);
        assert_eq!(result.functions, ["/r/cart.ts::add_tax"]);
        assert_eq!(
            result.metadata["locations"],
            json!([{"id": "/r/cart.ts::add_tax", "file": "/r/cart.ts", "startLine": 9}])
        );
    }

    #[test]
    fn unrecognized_question_takes_general_path() {
        let result = orchestrator().run_query(&context(), "hello world");

        assert_eq!(result.intent, "unknown");
        assert_eq!(result.metadata["stats"]["functions"], 3);
        assert!(result.error().is_none());
    }

    #[test]
    fn results_are_truncated() {
        let mut config = CartographConfig::default();
        config.query.max_results = 1;

        let result = Orchestrator::new(&config).run_query(&context(), "most called functions");

        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.metadata["totalFunctions"], 3);
    }

    #[test]
    fn explainer_failure_changes_only_the_preview() {
        let context = context();
        for question in [
            "who calls computeTotal",
            "what breaks if add_tax changes",
            "dependencies of ghost.ts",
            "hello world",
        ] {
            let failed = orchestrator()
                .with_explainer(Failing)
                .run_query(&context, question);
            let succeeded = orchestrator()
                .with_explainer(Fixed)
                .run_query(&context, question);

            assert_eq!(failed.files, succeeded.files, "{question}");
            assert_eq!(failed.functions, succeeded.functions, "{question}");
            assert_eq!(failed.metadata, succeeded.metadata, "{question}");
            assert_eq!(failed.context_preview, None);
            assert_eq!(succeeded.context_preview.as_deref(), Some("a preview"));
        }
    }
}
