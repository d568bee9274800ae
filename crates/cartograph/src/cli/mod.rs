//! CLI command implementations.

mod display;

pub mod blast_radius;
pub mod build;
pub mod chain;
pub mod cycles;
pub mod find;
pub mod init;
pub mod query;
pub mod rankings;
pub mod stats;

use std::path::PathBuf;

use cartograph::{AnalysisContext, Cartograph};
use serde::Serialize;

/// Options shared by every command.
pub struct Options {
    /// Workspace root.
    pub workspace: PathBuf,
    /// Findings directory override.
    pub findings: Option<PathBuf>,
    /// Emit JSON instead of formatted text.
    pub json: bool,
}

impl Options {
    /// Open the workspace, applying the findings directory override.
    pub fn open(&self) -> Result<Cartograph, cartograph::Error> {
        let cartograph = Cartograph::new(&self.workspace)?;
        Ok(match &self.findings {
            Some(dir) => cartograph.with_findings_dir(dir.clone()),
            None => cartograph,
        })
    }

    /// Open the workspace and build its analysis context.
    pub fn analyze(&self) -> Result<(Cartograph, AnalysisContext), cartograph::Error> {
        let cartograph = self.open()?;
        let context = cartograph.analyze()?;
        Ok((cartograph, context))
    }
}

/// Print `value` as pretty JSON.
fn print_json<T: Serialize>(value: &T) -> Result<(), cartograph::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
