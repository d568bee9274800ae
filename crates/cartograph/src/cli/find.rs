//! `cartograph find` command implementation.

use cartograph::analysis::find_function_by_name;
use colored::Colorize;
use serde_json::json;

use super::Options;
use super::print_json;

/// Run the find command.
pub fn run(options: &Options, name: &str) -> Result<(), cartograph::Error> {
    let (_, context) = options.analyze()?;

    let matches: Vec<_> = find_function_by_name(&context.graph, name)
        .into_iter()
        .filter_map(|node| node.as_function().map(|data| (node, data)))
        .collect();

    if options.json {
        let entries: Vec<_> = matches
            .iter()
            .map(|(node, data)| {
                json!({"id": node.id, "file": data.file, "startLine": data.start_line})
            })
            .collect();
        return print_json(&entries);
    }

    if matches.is_empty() {
        println!("No function named \"{}\"", name.cyan());
        return Ok(());
    }

    println!("Functions named \"{}\":", name.cyan().bold());
    println!();
    for (node, data) in &matches {
        println!(
            "  {} {}:{}",
            "•".dimmed(),
            data.file.white().bold(),
            data.start_line
        );
        println!("      {}", node.id.dimmed());
    }
    Ok(())
}
