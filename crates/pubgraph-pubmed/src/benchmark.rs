//! Pubmed-Diabetes reference dataset
//!
//! Loads the labelled node list and citation list of the benchmark and
//! merges them with freshly fetched tables.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use pubgraph_core::{Cell, Table};
use rand::Rng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashMap;
use zip::ZipArchive;

use crate::record::Pmid;
use crate::tables::ID_COLUMN;

pub const NODE_FILE: &str = "Pubmed-Diabetes.NODE.paper.tab";
pub const CITES_FILE: &str = "Pubmed-Diabetes.DIRECTED.cites.tab";
/// Directory of the data files inside `pubmed-diabetes.zip`
pub const ZIP_DATA_DIR: &str = "pubmed-diabetes/data";

/// No longer retrievable from PubMed; dropped from nodes and edges
pub const RETRACTED_PMID: Pmid = 17874530;

pub const LABEL_COLUMN: &str = "label";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceDataset {
    /// `(id, label)` in file order
    pub labels: Vec<(Pmid, u64)>,
    /// `(source, target)` in file order
    pub cites: Vec<(Pmid, Pmid)>,
}

impl ReferenceDataset {
    /// Load from the bundled `pubmed-diabetes.zip`, or from a directory
    /// holding its extracted `pubmed-diabetes/data` files.
    pub fn load(path: &Path) -> Result<Self> {
        let dataset = if path.is_dir() {
            Self::load_dir(path)?
        } else {
            Self::load_zip(path)?
        };
        log::info!(
            "Loaded reference dataset: {} nodes, {} citations",
            dataset.labels.len(),
            dataset.cites.len()
        );
        Ok(dataset)
    }

    fn load_zip(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut archive = ZipArchive::new(file)
            .with_context(|| format!("Invalid zip archive {}", path.display()))?;

        let nodes = read_zip_entry(&mut archive, &format!("{ZIP_DATA_DIR}/{NODE_FILE}"))?;
        let cites = read_zip_entry(&mut archive, &format!("{ZIP_DATA_DIR}/{CITES_FILE}"))?;
        Self::parse(nodes.as_bytes(), cites.as_bytes())
    }

    fn load_dir(dir: &Path) -> Result<Self> {
        let node_path = dir.join(NODE_FILE);
        let cites_path = dir.join(CITES_FILE);
        let nodes = File::open(&node_path)
            .with_context(|| format!("Failed to open {}", node_path.display()))?;
        let cites = File::open(&cites_path)
            .with_context(|| format!("Failed to open {}", cites_path.display()))?;
        Self::parse(nodes, cites)
    }

    pub fn parse(nodes: impl Read, cites: impl Read) -> Result<Self> {
        Ok(Self {
            labels: parse_nodes(nodes).context("Failed to parse node file")?,
            cites: parse_cites(cites).context("Failed to parse cites file")?,
        })
    }

    pub fn ids(&self) -> Vec<Pmid> {
        self.labels.iter().map(|&(id, _)| id).collect()
    }

    /// Randomize node order, so fetch failures are not clustered by file order
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.labels.shuffle(rng);
    }
}

fn read_zip_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let mut entry = archive
        .by_name(name)
        .with_context(|| format!("Missing archive member {name}"))?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to read archive member {name}"))?;
    Ok(text)
}

fn tsv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input)
}

/// Line 1 is a banner, line 2 a header; rows are `<pmid>\tlabel=<n>\t...`
fn parse_nodes(input: impl Read) -> Result<Vec<(Pmid, u64)>> {
    let mut labels = Vec::new();
    for (i, row) in tsv_reader(input).records().enumerate().skip(2) {
        let row = row?;
        let line = i + 1;
        let (Some(id), Some(label)) = (row.get(0), row.get(1)) else {
            bail!("line {line}: expected at least 2 columns");
        };
        let id: Pmid = id
            .trim()
            .parse()
            .with_context(|| format!("line {line}: bad identifier {id:?}"))?;
        let label: u64 = label
            .trim()
            .trim_start_matches("label=")
            .parse()
            .with_context(|| format!("line {line}: bad label {label:?}"))?;

        if id != RETRACTED_PMID {
            labels.push((id, label));
        }
    }
    Ok(labels)
}

/// Two banner lines; rows are `<n>\tpaper:<src>\t|\tpaper:<dst>`
fn parse_cites(input: impl Read) -> Result<Vec<(Pmid, Pmid)>> {
    let paper = |field: Option<&str>, line: usize| -> Result<Pmid> {
        let Some(field) = field else {
            bail!("line {line}: expected 4 columns");
        };
        field
            .trim()
            .trim_start_matches("paper:")
            .parse()
            .with_context(|| format!("line {line}: bad paper reference {field:?}"))
    };

    let mut cites = Vec::new();
    for (i, row) in tsv_reader(input).records().enumerate().skip(2) {
        let row = row?;
        let line = i + 1;
        let source = paper(row.get(1), line)?;
        let target = paper(row.get(3), line)?;

        if source != RETRACTED_PMID && target != RETRACTED_PMID {
            cites.push((source, target));
        }
    }
    Ok(cites)
}

/// Left-join labels onto the node table by `id`, appending a `label` column.
/// Unknown ids get a null label.
pub fn attach_labels(nodes: &mut Table, labels: &[(Pmid, u64)]) {
    let by_id: FxHashMap<Pmid, u64> = labels.iter().copied().collect();
    let idx = nodes.column_index(ID_COLUMN);
    nodes.add_column(LABEL_COLUMN, |row| {
        idx.and_then(|i| row[i].as_int())
            .and_then(|id| by_id.get(&id).copied())
            .map_or(Cell::Null, Cell::Int)
    });
}

/// Outer merge of fetched and reference edges on `(source, target)`.
///
/// Output columns are `source, target, new, cites`: `new` marks pairs present
/// in `fetched`, `cites` marks pairs present in the reference list. Each pair
/// appears once, sorted.
pub fn merge_reference_edges(fetched: &Table, reference: &[(Pmid, Pmid)]) -> Table {
    let fetched_pairs = edge_pairs(fetched);
    let reference_pairs: BTreeSet<(Pmid, Pmid)> = reference.iter().copied().collect();

    let mut merged = Table::new(["source", "target", "new", "cites"]);
    for pair in fetched_pairs.union(&reference_pairs) {
        let new = u64::from(fetched_pairs.contains(pair));
        let cites = u64::from(reference_pairs.contains(pair));
        merged.push_row(vec![
            Cell::Int(pair.0),
            Cell::Int(pair.1),
            Cell::Int(new),
            Cell::Int(cites),
        ]);
    }
    merged
}

fn edge_pairs(table: &Table) -> BTreeSet<(Pmid, Pmid)> {
    let (Some(s), Some(t)) = (table.column_index("source"), table.column_index("target")) else {
        return BTreeSet::new();
    };
    table
        .rows()
        .iter()
        .filter_map(|row| Some((row[s].as_int()?, row[t].as_int()?)))
        .collect()
}
