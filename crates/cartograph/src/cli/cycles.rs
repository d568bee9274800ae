//! `cartograph cycles` command implementation.

use cartograph::analysis::import_cycles;
use colored::Colorize;

use super::Options;
use super::print_json;

/// Run the cycles command.
pub fn run(options: &Options) -> Result<(), cartograph::Error> {
    let (_, context) = options.analyze()?;

    let cycles = import_cycles(&context.graph);

    if options.json {
        return print_json(&cycles);
    }

    if cycles.is_empty() {
        println!("{}", "No circular imports detected.".green());
        return Ok(());
    }

    println!(
        "Found {} circular imports:",
        cycles.len().to_string().red().bold()
    );
    println!();

    for (i, cycle) in cycles.iter().enumerate() {
        println!("  {} {}:", "Cycle".yellow().bold(), i + 1);
        // Cycles are closed: the first file repeats at the end.
        println!("    {}", cycle.nodes.join(" → ").dimmed());
    }

    Ok(())
}
