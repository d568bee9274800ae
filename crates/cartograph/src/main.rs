//! Cartograph CLI - structural questions about a codebase from the command line.
//!
//! Every analysis command reads collaborator findings from the findings
//! directory, builds the knowledge graph, and answers from it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Cartograph: structural knowledge graph and query interface.
#[derive(Parser)]
#[command(name = "cartograph")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Workspace root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Findings directory (defaults to the configured `collaborators.findings_dir`)
    #[arg(short, long, global = true)]
    findings: Option<PathBuf>,

    /// Print machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration and create the findings directory
    Init,

    /// Build the graph and report what went into it
    Build {
        /// Do not write a snapshot, even if snapshots are enabled
        #[arg(long)]
        no_snapshot: bool,
    },

    /// Ask a question in plain language
    Query {
        /// The question (e.g., "who calls computeTotal")
        question: String,
    },

    /// Show functions and files affected by changing a function
    BlastRadius {
        /// Function id or name
        function: String,
    },

    /// Rank functions by call-graph degree
    Central {
        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Rank files by weighted importance
    Important {
        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Detect circular imports
    Cycles,

    /// Find functions by name
    Find {
        /// Function name (exact, case-sensitive)
        name: String,
    },

    /// Show the shortest import chain between two files
    Chain {
        /// Importing file
        from: String,
        /// Imported file
        to: String,
    },

    /// Show graph statistics
    Stats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Determine workspace root
    let workspace = match cli.workspace {
        Some(w) => w,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::FAILURE;
            }
        },
    };

    let options = cli::Options {
        workspace,
        findings: cli.findings,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Init => cli::init::run(&options),
        Commands::Build { no_snapshot } => cli::build::run(&options, no_snapshot),
        Commands::Query { question } => cli::query::run(&options, &question),
        Commands::BlastRadius { function } => cli::blast_radius::run(&options, &function),
        Commands::Central { limit } => cli::rankings::run_central(&options, limit),
        Commands::Important { limit } => cli::rankings::run_important(&options, limit),
        Commands::Cycles => cli::cycles::run(&options),
        Commands::Find { name } => cli::find::run(&options, &name),
        Commands::Chain { from, to } => cli::chain::run(&options, &from, &to),
        Commands::Stats => cli::stats::run(&options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
