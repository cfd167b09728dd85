//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::catalog::{Section, Standard};

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Corpus root (overrides `paths.input_root`)
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Exit non-zero when error-severity findings exist
    #[arg(long)]
    pub fail_on_findings: bool,
}

/// Build command arguments.
#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Corpus root (overrides `paths.input_root`)
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Example file root (overrides `paths.example_root`)
    #[arg(short, long, value_name = "DIR")]
    pub examples: Option<PathBuf>,

    /// Output directory (overrides `paths.output_root`)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Exit non-zero when error-severity findings exist
    #[arg(long)]
    pub fail_on_findings: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only entries of this standard (e.g. 17, c++17, cpp17)
    #[arg(short, long, value_parser = parse_standard)]
    pub standard: Option<Standard>,

    /// Only entries of this section
    #[arg(long, value_enum)]
    pub section: Option<SectionArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the global configuration file path
    Path,

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the project file)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Section argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SectionArg {
    /// Core language features
    Core,
    /// Standard library features
    Stl,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Core => Self::CoreLanguage,
            SectionArg::Stl => Self::Stl,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

fn parse_standard(value: &str) -> Result<Standard, String> {
    value.parse::<Standard>().map_err(|e| e.to_string())
}
