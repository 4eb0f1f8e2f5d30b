//! Aggregation of populated records into node, text and edge tables

use std::io;
use std::path::Path;

use pubgraph_core::{Cell, Table, read_table, write_table};
use rustc_hash::FxHashSet;

use crate::record::{PUBLICATION_TYPE_PREFIX, Pmid, Record};

pub const NODE_FILE: &str = "node-data.csv";
pub const TEXT_FILE: &str = "texts.csv";
pub const EDGE_FILE: &str = "graph.csv";

pub const ID_COLUMN: &str = "id";
pub const TEXT_COLUMNS: [&str; 4] = ["id", "kind", "order", "content"];
pub const EDGE_COLUMNS: [&str; 2] = ["source", "target"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchTables {
    pub nodes: Table,
    pub texts: Table,
    pub edges: Table,
}

impl BatchTables {
    /// Write all three tables into `dir` as tab-separated files
    pub fn write(&self, dir: &Path) -> io::Result<()> {
        write_table(dir, NODE_FILE, &self.nodes)?;
        write_table(dir, TEXT_FILE, &self.texts)?;
        write_table(dir, EDGE_FILE, &self.edges)?;
        Ok(())
    }

    /// Load tables previously written by [`BatchTables::write`]; cells come
    /// back as strings.
    pub fn read(dir: &Path) -> io::Result<Self> {
        Ok(Self {
            nodes: read_table(&dir.join(NODE_FILE))?,
            texts: read_table(&dir.join(TEXT_FILE))?,
            edges: read_table(&dir.join(EDGE_FILE))?,
        })
    }
}

/// Build the batch tables from the populated subset of `records`.
///
/// Node columns are `id` followed by the union of field keys in first-seen
/// order. A missing `publication_type_*` flag is `false`, any other missing
/// field is null.
pub fn build_tables(records: &[Record]) -> BatchTables {
    let populated: Vec<&Record> = records.iter().filter(|r| r.is_populated()).collect();

    let mut keys: Vec<&str> = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for record in &populated {
        for key in record.fields().keys() {
            if seen.insert(key) {
                keys.push(key);
            }
        }
    }

    let mut nodes = Table::new(std::iter::once(ID_COLUMN).chain(keys.iter().copied()));
    let mut texts = Table::new(TEXT_COLUMNS);
    let mut pairs = Vec::new();

    for record in &populated {
        let mut row = Vec::with_capacity(keys.len() + 1);
        row.push(Cell::Int(record.id()));
        for key in &keys {
            let cell = match record.fields().get(key) {
                Some(value) => value.clone(),
                None if key.starts_with(PUBLICATION_TYPE_PREFIX) => Cell::Bool(false),
                None => Cell::Null,
            };
            row.push(cell);
        }
        nodes.push_row(row);

        for segment in record.texts() {
            texts.push_row(vec![
                Cell::Int(record.id()),
                Cell::from(segment.kind.as_str()),
                Cell::Int(segment.order as u64),
                Cell::from(segment.content.as_str()),
            ]);
        }

        pairs.extend(record.references().iter().map(|&target| (record.id(), target)));
    }

    let node_ids: FxHashSet<Pmid> = populated.iter().map(|r| r.id()).collect();
    let mut edges = Table::new(EDGE_COLUMNS);
    for (source, target) in filter_edges(&pairs, &node_ids) {
        edges.push_row(vec![Cell::Int(source), Cell::Int(target)]);
    }

    BatchTables {
        nodes,
        texts,
        edges,
    }
}

/// Keep only edges whose both endpoints are known nodes, preserving order
pub fn filter_edges(edges: &[(Pmid, Pmid)], nodes: &FxHashSet<Pmid>) -> Vec<(Pmid, Pmid)> {
    edges
        .iter()
        .copied()
        .filter(|(source, target)| nodes.contains(source) && nodes.contains(target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Fields, TextKind, TextSegment};
    use tempfile::TempDir;

    fn record(id: Pmid, fields: &[(&str, Cell)], refs: &[Pmid]) -> Record {
        let mut f = Fields::new();
        for (k, v) in fields {
            f.insert(*k, v.clone());
        }
        let texts = vec![TextSegment {
            kind: TextKind::Title,
            order: 0,
            content: format!("Title {id}"),
        }];
        Record::populated(id, f, texts, refs.to_vec())
    }

    #[test]
    fn edges_restricted_to_known_nodes() {
        let nodes: FxHashSet<Pmid> = [1, 2, 3].into_iter().collect();
        let kept = filter_edges(&[(1, 2), (2, 4), (5, 1)], &nodes);
        assert_eq!(kept, [(1, 2)]);
    }

    #[test]
    fn edge_table_from_records() {
        let records = vec![
            record(1, &[], &[2]),
            record(2, &[], &[4]),
            record(3, &[], &[]),
            Record::new(5),
        ];
        let tables = build_tables(&records);

        assert_eq!(tables.nodes.len(), 3);
        assert_eq!(tables.edges.columns(), ["source", "target"]);
        assert_eq!(tables.edges.rows(), [vec![Cell::Int(1), Cell::Int(2)]]);
    }

    #[test]
    fn node_columns_are_union_in_first_seen_order() {
        let records = vec![
            record(
                1,
                &[
                    ("publication_status", "ppublish".into()),
                    ("publication_type_D016428", true.into()),
                ],
                &[],
            ),
            record(
                2,
                &[
                    ("publication_status", "epublish".into()),
                    ("article_id_doi", "10.1/x".into()),
                ],
                &[],
            ),
        ];
        let tables = build_tables(&records);

        assert_eq!(
            tables.nodes.columns(),
            ["id", "publication_status", "publication_type_D016428", "article_id_doi"]
        );
        // absent flag is false, absent identifier is null
        assert_eq!(tables.nodes.get(1, "publication_type_D016428"), Some(&Cell::Bool(false)));
        assert_eq!(tables.nodes.get(0, "article_id_doi"), Some(&Cell::Null));
        assert_eq!(tables.nodes.get(1, "id"), Some(&Cell::Int(2)));
    }

    #[test]
    fn unpopulated_records_excluded() {
        let tables = build_tables(&[Record::new(9)]);
        assert!(tables.nodes.is_empty());
        assert_eq!(tables.nodes.columns(), ["id"]);
        assert!(tables.texts.is_empty());
    }

    #[test]
    fn text_rows_carry_kind_and_order() {
        let tables = build_tables(&[record(4, &[], &[])]);
        assert_eq!(tables.texts.columns(), TEXT_COLUMNS);
        assert_eq!(
            tables.texts.rows(),
            [vec![
                Cell::Int(4),
                Cell::from("title"),
                Cell::Int(0),
                Cell::from("Title 4"),
            ]]
        );
    }

    #[test]
    fn write_then_read_all_three() {
        let dir = TempDir::new().unwrap();
        let tables = build_tables(&[
            record(1, &[("publication_type_D016428", true.into())], &[2]),
            record(2, &[], &[1]),
        ]);
        tables.write(dir.path()).unwrap();

        for name in [NODE_FILE, TEXT_FILE, EDGE_FILE] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }

        let back = BatchTables::read(dir.path()).unwrap();
        assert_eq!(back.nodes.len(), 2);
        assert_eq!(back.nodes.get(1, "publication_type_D016428"), Some(&Cell::from("0")));
        assert_eq!(back.edges.len(), 2);
        assert_eq!(back.texts.get(0, "content"), Some(&Cell::from("Title 1")));
    }
}
