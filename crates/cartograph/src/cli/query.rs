//! `cartograph query` command implementation.

use cartograph::Orchestrator;
use cartograph::query::SummaryExplainer;
use colored::Colorize;

use super::Options;
use super::display::print_section;
use super::print_json;

/// Run the query command.
pub fn run(options: &Options, question: &str) -> Result<(), cartograph::Error> {
    let (cartograph, context) = options.analyze()?;
    let orchestrator = Orchestrator::new(cartograph.config()).with_explainer(SummaryExplainer);

    let result = orchestrator.run_query(&context, question);

    if options.json {
        return print_json(&result);
    }

    println!("{} {}", "Intent:".dimmed(), result.intent.cyan().bold());
    if let Some(preview) = &result.context_preview {
        println!("{preview}");
    }
    if let Some(error) = result.error() {
        println!("{}", error.yellow());
        return Ok(());
    }
    println!();

    print_section("Files", &result.files, "(none)");
    print_section("Functions", &result.functions, "(none)");

    if let serde_json::Value::Object(metadata) = &result.metadata {
        let scalars: Vec<_> = metadata
            .iter()
            .filter(|(_, value)| !value.is_array() && !value.is_object())
            .collect();
        if !scalars.is_empty() {
            println!();
            for (key, value) in scalars {
                println!("  {}: {}", key.dimmed(), value);
            }
        }
    }
    Ok(())
}
