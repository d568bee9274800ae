//! `cartograph stats` command implementation.

use colored::Colorize;
use serde_json::json;

use super::Options;
use super::print_json;

/// Run the stats command.
pub fn run(options: &Options) -> Result<(), cartograph::Error> {
    let (cartograph, context) = options.analyze()?;
    let stats = context.graph.stats();

    if options.json {
        return print_json(&json!({
            "stats": stats,
            "missing": context.report.missing,
            "builtAt": context.built_at.to_rfc3339(),
        }));
    }

    println!("{}", "Cartograph Graph Statistics".cyan().bold());
    println!();
    println!(
        "  {}: {}",
        "Findings".white().bold(),
        cartograph.findings_dir().display()
    );
    println!();
    println!(
        "  {}: {} total",
        "Nodes".white().bold(),
        stats.nodes().to_string().green()
    );
    println!("    {}: {}", "Files".dimmed(), stats.files);
    println!("    {}: {}", "Folders".dimmed(), stats.folders);
    println!("    {}: {}", "Functions".dimmed(), stats.functions);
    println!();
    println!(
        "  {}: {} total",
        "Edges".white().bold(),
        stats.edges().to_string().green()
    );
    println!("    {}: {}", "Imports".dimmed(), stats.imports);
    println!("    {}: {}", "Defines".dimmed(), stats.defines);
    println!("    {}: {}", "Calls".dimmed(), stats.calls);

    if !context.report.missing.is_empty() {
        println!();
        let missing: Vec<_> = context
            .report
            .missing
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "  {}: {}",
            "Warning".yellow().bold(),
            format!("no {} findings; those layers are empty", missing.join(", ")).dimmed()
        );
    }
    Ok(())
}
