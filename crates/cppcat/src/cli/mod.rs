//! Command-line interface for cppcat.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    BuildCommand, CheckCommand, ConfigCommand, ListCommand, OutputFormat, SectionArg,
    StatsCommand,
};

use crate::logging::Verbosity;

/// cppcat - Check and publish a C++ feature catalog
///
/// Loads a Markdown corpus made of a master index and per-standard detail
/// documents, cross-checks the two, and renders a static site.
#[derive(Debug, Parser)]
#[command(name = "cppcat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a configuration file (replaces ./cppcat.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the corpus and report consistency findings
    Check(CheckCommand),

    /// Load, check, render and publish the site
    Build(BuildCommand),

    /// List catalog entries
    List(ListCommand),

    /// Show entry counts per standard and section
    Stats(StatsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
