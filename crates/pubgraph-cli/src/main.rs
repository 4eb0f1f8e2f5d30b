//! pubgraph - PubMed citation graph builder
//!
//! Fetches article metadata for a list of PMIDs (by default the
//! Pubmed-Diabetes benchmark nodes) and writes node, text and citation
//! tables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "pubgraph")]
#[command(about = "Pull PubMed metadata into node, text and citation tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Logging verbosity level (DEBUG, INFO, WARNING, ERROR, CRITICAL)
    #[arg(short, long, global = true, default_value = "INFO", value_parser = parse_loglevel)]
    loglevel: LevelFilter,

    /// Config file path (default: ./pubgraph.toml or ~/.config/pubgraph/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch PubMed records and write the output tables
    Fetch(cmd::fetch::FetchArgs),
    /// Show row and column counts of a previous fetch
    Summary(cmd::summary::SummaryArgs),
    /// Show current configuration
    Config,
}

fn parse_loglevel(s: &str) -> Result<LevelFilter, String> {
    pubgraph_core::parse_level(s).ok_or_else(|| {
        format!("invalid level {s:?}, expected one of DEBUG, INFO, WARNING, ERROR, CRITICAL")
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(pubgraph_core::ProgressContext::new());

    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    pubgraph_core::init_logging(cli.loglevel, multi)?;

    if let Err(e) = pubgraph_core::install_signal_handlers() {
        log::warn!("Failed to install signal handlers: {e}");
    }

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Fetch(args) => cmd::fetch::run(args, &config, &progress),
        Command::Summary(args) => cmd::summary::run(args),
        Command::Config => {
            let on_off = |b: bool| if b { "on" } else { "off" };
            let api_key = match config.fetch.api_key {
                Some(_) => "configured",
                None => "not set",
            };
            cmd::print_summary(
                "Setting",
                &[
                    ("Efetch base URL", config.fetch.base_url.clone()),
                    ("Timeout", format!("{}s", config.fetch.timeout_secs)),
                    ("Pacing", on_off(config.fetch.pace).to_owned()),
                    ("NCBI API key", api_key.to_owned()),
                    (
                        "Benchmark data",
                        config.benchmark.dataset.display().to_string(),
                    ),
                    ("Shuffle benchmark", on_off(config.benchmark.shuffle).to_owned()),
                    (
                        "Output directory",
                        config.output.default_dir.display().to_string(),
                    ),
                ],
            );
            Ok(())
        }
    }
}
