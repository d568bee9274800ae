//! `cartograph blast-radius` command implementation.

use cartograph::NodeType;
use cartograph::analysis::{find_function_by_name, function_blast_radius};
use colored::Colorize;

use super::Options;
use super::display::print_section;
use super::print_json;

/// Run the blast-radius command.
pub fn run(options: &Options, function: &str) -> Result<(), cartograph::Error> {
    let (_, context) = options.analyze()?;
    let graph = &context.graph;

    // Accept either an id or a name; a name resolves to its first definition.
    let id = if graph
        .get_node(function)
        .is_some_and(|node| node.node_type() == NodeType::Function)
    {
        function.to_string()
    } else if let Some(node) = find_function_by_name(graph, function).first() {
        node.id.clone()
    } else {
        println!("Function \"{}\" not found", function.cyan());
        return Ok(());
    };

    let radius = function_blast_radius(graph, &id);

    if options.json {
        return print_json(&radius);
    }

    if radius.is_empty() {
        println!("Nothing depends on \"{}\"", id.cyan());
        return Ok(());
    }

    println!("Blast radius of \"{}\":", id.cyan().bold());
    println!();
    print_section("Affected functions", &radius.affected_functions, "(none)");
    print_section("Affected files", &radius.affected_files, "(none)");
    println!();
    println!(
        "{}: {} functions, {} files, depth {}",
        "Total".dimmed(),
        radius.affected_functions.len().to_string().green(),
        radius.affected_files.len().to_string().green(),
        radius.depth.to_string().yellow()
    );
    Ok(())
}
