//! Property tests for the parser, planner and graph algorithms.

use proptest::prelude::*;

use cartograph::analysis::{find_cycles, function_blast_radius};
use cartograph::query::{KeywordPlanner, PlanIntent, QueryParser, QueryPlanner};
use cartograph::{Edge, EdgeType, KnowledgeGraph, Node};

fn call_graph(edges: &[(u8, u8)]) -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::new();
    for id in 0..16u8 {
        graph.add_node(Node::function(format!("f{id}"), format!("f{id}"), "a.ts", 1));
    }
    for (callee, caller) in edges {
        graph.add_edge(Edge::new(
            format!("f{callee}"),
            format!("f{caller}"),
            EdgeType::Calls,
        ));
    }
    graph
}

proptest! {
    /// QueryParser::parse must never panic, regardless of input.
    #[test]
    fn parse_never_panics(input in "\\PC{0,200}") {
        let _ = QueryParser::new().parse(&input);
    }

    /// A parsed target is never empty and carries no trailing punctuation.
    #[test]
    fn parsed_target_is_clean(
        verb in "(who calls|dependencies of|history of|risks in|explain)",
        target in "[a-zA-Z_][a-zA-Z0-9_./]{0,30}",
        punctuation in "(\\?|!|\\.|)",
    ) {
        let question = format!("{verb} {target}{punctuation}");
        if let Some(parsed) = QueryParser::new().parse(&question) {
            prop_assert!(!parsed.target.is_empty());
            prop_assert!(!parsed.target.ends_with(['?', '!', '.', ',']));
        }
    }

    /// The planner never asks for a function-scoped operation without a name.
    #[test]
    fn plan_has_name_when_needed(input in "\\PC{0,120}") {
        let plan = KeywordPlanner.plan(&input);
        if matches!(plan.intent, PlanIntent::BlastRadius | PlanIntent::FindFunction) {
            prop_assert!(plan.function_name.is_some());
        }
    }

    /// Blast radius never repeats a function and never includes the start.
    #[test]
    fn blast_radius_is_duplicate_free(
        edges in prop::collection::vec((0u8..16, 0u8..16), 0..60),
        start in 0u8..16,
    ) {
        let graph = call_graph(&edges);
        let start = format!("f{start}");

        let radius = function_blast_radius(&graph, &start);

        let mut seen = std::collections::HashSet::new();
        for id in &radius.affected_functions {
            prop_assert!(seen.insert(id.clone()), "duplicate {}", id);
        }
        prop_assert!(!seen.contains(&start));
        prop_assert!(radius.depth <= radius.affected_functions.len());
    }

    /// Every reported cycle is closed and follows real edges.
    #[test]
    fn cycles_follow_edges(edges in prop::collection::vec((0u8..8, 0u8..8), 0..30)) {
        let names: Vec<(String, String)> = edges
            .iter()
            .map(|(a, b)| (format!("m{a}"), format!("m{b}")))
            .collect();

        let cycles = find_cycles(names.iter().map(|(a, b)| (a.as_str(), b.as_str())));

        for cycle in cycles {
            prop_assert!(cycle.nodes.len() >= 2);
            prop_assert_eq!(cycle.nodes.first(), cycle.nodes.last());
            for pair in cycle.nodes.windows(2) {
                prop_assert!(names.iter().any(|(a, b)| *a == pair[0] && *b == pair[1]));
            }
        }
    }
}
