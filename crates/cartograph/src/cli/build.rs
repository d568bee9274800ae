//! `cartograph build` command implementation.

use colored::Colorize;
use serde_json::json;

use super::Options;
use super::print_json;

/// Run the build command.
pub fn run(options: &Options, no_snapshot: bool) -> Result<(), cartograph::Error> {
    let (cartograph, context) = options.analyze()?;
    let report = &context.report;

    let snapshot = if no_snapshot || !cartograph.config().snapshot.enabled {
        None
    } else {
        Some(cartograph.write_snapshot(&context)?)
    };

    if options.json {
        return print_json(&json!({
            "report": report,
            "stats": context.graph.stats(),
            "snapshot": snapshot,
        }));
    }

    println!("{}", "Graph built".green().bold());
    println!();
    println!(
        "  {}: {} files, {} folders, {} functions",
        "Nodes".white().bold(),
        report.files.to_string().green(),
        report.folders.to_string().green(),
        report.functions.to_string().green()
    );
    println!(
        "  {}: {} calls resolved, {} imports",
        "Edges".white().bold(),
        report.calls_resolved.to_string().green(),
        report.imports.to_string().green()
    );

    if report.calls_unresolved > 0 || report.imports_dropped > 0 || report.orphan_functions > 0 {
        println!(
            "  {}: {} unresolved calls, {} imports outside the workspace, {} functions in unknown files",
            "Dropped".yellow().bold(),
            report.calls_unresolved,
            report.imports_dropped,
            report.orphan_functions
        );
    }
    if !report.missing.is_empty() {
        let missing: Vec<_> = report.missing.iter().map(ToString::to_string).collect();
        println!(
            "  {}: {}",
            "Missing findings".yellow().bold(),
            missing.join(", ")
        );
    }

    if let Some(path) = snapshot {
        println!();
        println!("  {}: {}", "Snapshot".dimmed(), path.display());
    }
    Ok(())
}
