//! Summary subcommand - inspect the tables of a previous fetch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pubgraph_core::{Cell, Table, progress::fmt_num};
use pubgraph_pubmed::BatchTables;
use pubgraph_pubmed::tables::{EDGE_FILE, NODE_FILE, TEXT_FILE};

use super::print_summary;

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Output directory of a previous `fetch`
    #[arg(default_value = "output")]
    pub outdir: PathBuf,
}

pub fn run(args: SummaryArgs) -> Result<()> {
    let tables = BatchTables::read(&args.outdir)
        .with_context(|| format!("Failed to read tables from {}", args.outdir.display()))?;

    let mut rows = vec![
        (NODE_FILE, shape(&tables.nodes)),
        (TEXT_FILE, shape(&tables.texts)),
        (EDGE_FILE, shape(&tables.edges)),
    ];
    if let Some((new, cites, both)) = edge_overlap(&tables.edges) {
        rows.push((
            "Edge overlap",
            format!("{new} fetched, {cites} reference, {both} both"),
        ));
    }

    print_summary("Table", &rows);
    Ok(())
}

fn shape(table: &Table) -> String {
    format!(
        "{} rows x {} columns",
        fmt_num(table.len()),
        table.columns().len()
    )
}

/// Counts of fetched, reference and shared edges for a merged benchmark graph
fn edge_overlap(edges: &Table) -> Option<(usize, usize, usize)> {
    let new = edges.column_index("new")?;
    let cites = edges.column_index("cites")?;

    let flag = |cell: &Cell| cell.as_int() == Some(1);
    let mut counts = (0, 0, 0);
    for row in edges.rows() {
        let (n, c) = (flag(&row[new]), flag(&row[cites]));
        counts.0 += usize::from(n);
        counts.1 += usize::from(c);
        counts.2 += usize::from(n && c);
    }
    Some(counts)
}
