//! Fetch subcommand - populate PubMed records and write the output tables

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use pubgraph_core::{SharedProgress, cleanup_tmp_files, progress::fmt_num};
use pubgraph_pubmed::{
    BatchFetcher, Pmid, ReferenceDataset, attach_labels, merge_reference_edges,
};

use super::print_summary;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Output directory (default: [output] default_dir from config)
    pub outdir: Option<PathBuf>,

    /// File with one PMID per line, `-` for stdin (default: benchmark node list)
    #[arg(short, long)]
    pub infile: Option<PathBuf>,

    /// Display a progress bar
    #[arg(short, long)]
    pub progress: bool,

    /// Disable jittered pauses before network requests
    #[arg(long)]
    pub no_pace: bool,

    /// `pubmed-diabetes.zip`, or its extracted data directory
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Keep benchmark node order instead of shuffling
    #[arg(long)]
    pub no_shuffle: bool,

    /// Maximum number of identifiers to process
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

pub fn run(args: FetchArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let output_dir = args
        .outdir
        .clone()
        .unwrap_or_else(|| config.output.default_dir.clone());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    cleanup_tmp_files(&output_dir)?;

    // Without an input file, fetch the benchmark nodes and merge its data back in
    let (mut ids, reference) = match &args.infile {
        Some(path) => (read_ids(path)?, None),
        None => {
            let path = args
                .dataset
                .clone()
                .unwrap_or_else(|| config.benchmark.dataset.clone());
            let mut dataset = ReferenceDataset::load(&path)?;
            if config.benchmark.shuffle && !args.no_shuffle {
                dataset.shuffle(&mut rand::thread_rng());
            }
            (dataset.ids(), Some(dataset))
        }
    };
    if let Some(limit) = args.limit {
        ids.truncate(limit);
    }

    let pm_config = config
        .fetch
        .to_pubmed(output_dir.join("cache"), !args.no_pace);

    log::info!("Fetching {} PubMed records", fmt_num(ids.len()));
    log::info!("  Output: {}", output_dir.display());
    log::info!("  Pacing: {}", pm_config.pace_delays);

    let mut fetcher = BatchFetcher::new(pm_config).context("Failed to create cache directory")?;
    let pb = progress.batch_bar("pubmed", ids.len() as u64, args.progress);
    let summary = fetcher.populate(&ids, &pb);
    pb.finish_and_clear();
    summary.log();

    let mut tables = fetcher.tables();
    if let Some(dataset) = &reference {
        // keep the human annotations
        attach_labels(&mut tables.nodes, &dataset.labels);
        tables.edges = merge_reference_edges(&tables.edges, &dataset.cites);
    }
    tables
        .write(&output_dir)
        .with_context(|| format!("Failed to write tables to {}", output_dir.display()))?;

    print_summary(
        "PubMed",
        &[
            (
                "Records",
                format!(
                    "{}/{} ({} failed)",
                    fmt_num(summary.populated + summary.skipped),
                    fmt_num(summary.total),
                    fmt_num(summary.failed)
                ),
            ),
            (
                "Sources",
                format!("{} cached, {} fetched", summary.cached, summary.fetched),
            ),
            ("Texts", fmt_num(tables.texts.len())),
            ("Edges", fmt_num(tables.edges.len())),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );

    if summary.interrupted {
        log::warn!("Interrupted: tables contain the records populated so far");
    }
    Ok(())
}

/// Identifiers from a file, or stdin when the path is `-`
fn read_ids(path: &Path) -> Result<Vec<Pmid>> {
    if path == Path::new("-") {
        parse_ids(io::stdin().lock()).context("Failed to read PMIDs from stdin")
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        parse_ids(BufReader::new(file))
            .with_context(|| format!("Failed to read PMIDs from {}", path.display()))
    }
}

/// One PMID per line; blank lines are ignored
fn parse_ids(reader: impl BufRead) -> Result<Vec<Pmid>> {
    let mut ids = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let id: Pmid = line
            .parse()
            .with_context(|| format!("line {}: invalid PMID {line:?}", i + 1))?;
        ids.push(id);
    }
    Ok(ids)
}
