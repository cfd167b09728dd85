//! `cppcat` - CLI for the C++ feature catalog
//!
//! Checks the Markdown corpus for consistency and publishes it as a static
//! site.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use cppcat::catalog::{Section, Standard};
use cppcat::cli::{
    BuildCommand, CheckCommand, Cli, Command, ConfigCommand, ListCommand, OutputFormat,
};
use cppcat::config::PROJECT_CONFIG_FILE;
use cppcat::{
    check, init_logging, load, publish, render, Config, Error, FsLinkResolver, FsSource,
    LoadOutcome, RenderOptions, Report,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // `config validate` reports problems instead of failing on them.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        handle_validate(file.clone().or_else(|| cli.config.clone()));
        return Ok(());
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Check(cmd) => handle_check(config, cmd).await,
        Command::Build(cmd) => handle_build(config, cmd).await,
        Command::List(cmd) => handle_list(&config, &cmd).await,
        Command::Stats(cmd) => handle_stats(&config, cmd.json).await,
        Command::Config(cmd) => handle_config(&config, &cmd),
    }
}

async fn load_corpus(config: &Config) -> Result<LoadOutcome> {
    let source = Arc::new(FsSource::new(&config.paths.input_root));
    let outcome = load(Arc::clone(&source), &config.loader_options())
        .await
        .with_context(|| format!("loading corpus from {}", source.root().display()))?;
    for diagnostic in &outcome.diagnostics {
        warn!("{diagnostic}");
    }
    Ok(outcome)
}

/// Fail when the gate is enabled and the report has error-severity findings.
fn enforce_gate(report: &Report, fail_on_findings: bool) -> Result<()> {
    let count = report.error_count();
    if fail_on_findings && count > 0 {
        return Err(Error::FindingsGate { count }.into());
    }
    Ok(())
}

async fn handle_check(mut config: Config, cmd: CheckCommand) -> Result<()> {
    if let Some(input) = cmd.input {
        config.paths.input_root = input;
    }
    let fail_on_findings = cmd.fail_on_findings || config.check.fail_on_findings;

    let outcome = load_corpus(&config).await?;
    let report = check(&outcome.catalog);

    match cmd.format {
        OutputFormat::Plain => println!("{report}"),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct CheckOutput<'a> {
                report: &'a Report,
                malformed: Vec<String>,
            }
            let output = CheckOutput {
                report: &report,
                malformed: outcome.diagnostics.iter().map(ToString::to_string).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    enforce_gate(&report, fail_on_findings)
}

async fn handle_build(mut config: Config, cmd: BuildCommand) -> Result<()> {
    if let Some(input) = cmd.input {
        config.paths.input_root = input;
    }
    if let Some(examples) = cmd.examples {
        config.paths.example_root = examples;
    }
    if let Some(output) = cmd.output {
        config.paths.output_root = output;
    }
    let fail_on_findings = cmd.fail_on_findings || config.check.fail_on_findings;

    let outcome = load_corpus(&config).await?;
    let report = check(&outcome.catalog);
    for finding in report.findings() {
        warn!("{finding}");
    }

    let resolver = FsLinkResolver::new(&config.paths.example_root);
    let rendered = render(
        &outcome.catalog,
        Some(&report),
        &RenderOptions::from(&config.render),
        &resolver,
    )
    .context("rendering site")?;
    for broken in &rendered.broken_links {
        warn!("{broken}");
    }

    let summary = publish(&rendered.site, &config.paths.output_root)
        .with_context(|| format!("publishing to {}", config.paths.output_root.display()))?;
    info!(
        written = summary.written.len(),
        unchanged = summary.unchanged.len(),
        "build finished"
    );
    println!(
        "Published {} file(s) to {} ({} unchanged)",
        summary.written.len() + summary.unchanged.len(),
        config.paths.output_root.display(),
        summary.unchanged.len()
    );

    if fail_on_findings && report.error_count() > 0 {
        println!("{report}");
    }
    enforce_gate(&report, fail_on_findings)
}

async fn handle_list(config: &Config, cmd: &ListCommand) -> Result<()> {
    let outcome = load_corpus(config).await?;
    let entries = outcome
        .catalog
        .select(cmd.standard, cmd.section.map(Section::from));

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => {
            for entry in entries {
                println!(
                    "{:<6} {:<14} {:<11} {}",
                    entry.standard.to_string(),
                    entry.section.to_string(),
                    entry.status.to_string(),
                    entry.name
                );
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct PairStats {
    standard: Standard,
    section: Section,
    listed: usize,
    documented: usize,
}

async fn handle_stats(config: &Config, json: bool) -> Result<()> {
    let outcome = load_corpus(config).await?;
    let catalog = &outcome.catalog;
    let stats: Vec<PairStats> = catalog
        .pairs()
        .into_iter()
        .map(|(standard, section)| PairStats {
            standard,
            section,
            listed: catalog.index_for(standard, section).count(),
            documented: catalog.details_for(standard, section).count(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{:<6} {:<14} {:>6} {:>10}", "", "", "listed", "documented");
    for row in &stats {
        println!(
            "{:<6} {:<14} {:>6} {:>10}",
            row.standard.to_string(),
            row.section.to_string(),
            row.listed,
            row.documented
        );
    }
    println!(
        "{:<21} {:>6} {:>10}",
        "total",
        catalog.index().len(),
        catalog.details().len()
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                print!("{}", config.to_display_string());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            handle_validate(file.clone());
        }
    }
    Ok(())
}

fn handle_validate(file: Option<PathBuf>) {
    let path = file.unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    println!("Validating configuration: {}", path.display());
    match Config::load_file(&path) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
}
