//! `cartograph central` and `cartograph important` command implementations.

use cartograph::analysis::{file_importance, function_centrality};
use colored::Colorize;

use super::Options;
use super::print_json;

/// Run the central command.
pub fn run_central(options: &Options, limit: usize) -> Result<(), cartograph::Error> {
    let (_, context) = options.analyze()?;
    let ranking: Vec<_> = function_centrality(&context.graph)
        .into_iter()
        .take(limit)
        .collect();

    if options.json {
        return print_json(&ranking);
    }

    if ranking.is_empty() {
        println!("{}", "No functions in the graph.".dimmed());
        return Ok(());
    }

    println!("{}", "Most central functions".cyan().bold());
    println!();
    for (rank, entry) in ranking.iter().enumerate() {
        println!(
            "  {:>3}. {} {}",
            rank + 1,
            entry.name.white().bold(),
            format!(
                "({} in, {} out) {}",
                entry.in_degree, entry.out_degree, entry.file
            )
            .dimmed()
        );
    }
    Ok(())
}

/// Run the important command.
pub fn run_important(options: &Options, limit: usize) -> Result<(), cartograph::Error> {
    let (cartograph, context) = options.analyze()?;
    let ranking: Vec<_> = file_importance(&context.graph, cartograph.config().importance)
        .into_iter()
        .take(limit)
        .collect();

    if options.json {
        return print_json(&ranking);
    }

    if ranking.is_empty() {
        println!("{}", "No files in the graph.".dimmed());
        return Ok(());
    }

    println!("{}", "Most important files".cyan().bold());
    println!();
    for (rank, entry) in ranking.iter().enumerate() {
        println!(
            "  {:>3}. {} {}",
            rank + 1,
            entry.id.white().bold(),
            format!(
                "(score {:.1}: {} functions, {} importers)",
                entry.importance, entry.function_count, entry.importer_count
            )
            .dimmed()
        );
    }
    Ok(())
}
