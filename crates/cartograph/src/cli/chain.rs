//! `cartograph chain` command implementation.

use cartograph::analysis::{dependency_chain, resolve_file};
use colored::Colorize;

use super::Options;
use super::print_json;

/// Run the chain command.
pub fn run(options: &Options, from: &str, to: &str) -> Result<(), cartograph::Error> {
    let (_, context) = options.analyze()?;
    let graph = &context.graph;

    let (Some(from_id), Some(to_id)) = (resolve_file(graph, from), resolve_file(graph, to)) else {
        println!("{}", "Both files must exist in the graph.".yellow());
        return Ok(());
    };

    let chain = dependency_chain(graph, from_id, to_id);

    if options.json {
        return print_json(&chain);
    }

    match chain {
        Some(path) => {
            println!(
                "Import chain ({} hops):",
                path.len().saturating_sub(1).to_string().green()
            );
            println!("    {}", path.join(" → "));
        }
        None => println!(
            "{} does not depend on {}",
            from_id.cyan(),
            to_id.cyan()
        ),
    }
    Ok(())
}
