//! `cartograph init` command implementation.

use cartograph::Cartograph;
use colored::Colorize;

use super::Options;

/// Run the init command.
pub fn run(options: &Options) -> Result<(), cartograph::Error> {
    let config_path = Cartograph::init(&options.workspace)?;
    let cartograph = options.open()?;

    println!("{} {}", "Initialized".green().bold(), config_path.display());
    println!(
        "  {}: {}",
        "Findings directory".dimmed(),
        cartograph.findings_dir().display()
    );
    println!(
        "  {}",
        "Place structure.json, extraction.json, dependencies.json, history.json and risks.json there."
            .dimmed()
    );
    Ok(())
}
