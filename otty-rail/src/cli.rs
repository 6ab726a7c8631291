use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manage the projects shown in the OTTY workspace rail.
#[derive(Debug, Parser)]
#[command(name = "otty-rail", version, about)]
pub(crate) struct Cli {
    /// Workspace file to use instead of the default location.
    #[arg(long, value_name = "PATH", global = true)]
    pub(crate) file: Option<PathBuf>,

    /// Maximum number of unpinned projects to keep.
    #[arg(long, value_name = "N", global = true)]
    pub(crate) max_recents: Option<usize>,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Debug, Clone, Default, Subcommand)]
pub(crate) enum Command {
    /// Print the rail in display order.
    #[default]
    List,
    /// Add (or re-pin) the project rooted at PATH and select it.
    Add { path: PathBuf },
    /// Remove a project.
    Remove { id: String },
    /// Toggle the pinned flag of a project.
    Pin { id: String },
    /// Select a project and mark it as just opened.
    Select { id: String },
    /// Print the selected project.
    Show,
}
