//! Column-named row tables with loosely typed cells

use std::borrow::Cow;
use std::fmt;

/// One scalar cell.
///
/// Rendered for delimited output as: `Null` → empty, `Bool` → `1`/`0`,
/// `Int` → decimal, `Str` → verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(u64),
    Str(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(true) => Cow::Borrowed("1"),
            Self::Bool(false) => Cow::Borrowed("0"),
            Self::Int(n) => Cow::Owned(n.to_string()),
            Self::Str(s) => Cow::Borrowed(s),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Rows of cells under a fixed, ordered header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    /// Cell at `row` under column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        let idx = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Append a column computed from each existing row.
    pub fn add_column(&mut self, name: impl Into<String>, mut value: impl FnMut(&[Cell]) -> Cell) {
        self.columns.push(name.into());
        for row in &mut self.rows {
            let cell = value(row);
            row.push(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_cells() {
        assert_eq!(Cell::Null.render(), "");
        assert_eq!(Cell::Bool(true).render(), "1");
        assert_eq!(Cell::Bool(false).render(), "0");
        assert_eq!(Cell::Int(42).render(), "42");
        assert_eq!(Cell::from("ppublish").render(), "ppublish");
    }

    #[test]
    fn option_into_cell() {
        assert_eq!(Cell::from(None::<String>), Cell::Null);
        assert_eq!(Cell::from(Some("x")), Cell::Str("x".to_string()));
    }

    #[test]
    fn as_int_parses_strings() {
        assert_eq!(Cell::Int(7).as_int(), Some(7));
        assert_eq!(Cell::from("12187484").as_int(), Some(12187484));
        assert_eq!(Cell::from("abc").as_int(), None);
        assert_eq!(Cell::Null.as_int(), None);
    }

    #[test]
    fn push_and_lookup() {
        let mut t = Table::new(["source", "target"]);
        t.push_row(vec![Cell::Int(1), Cell::Int(2)]);
        t.push_row(vec![Cell::Int(2), Cell::Int(4)]);

        assert_eq!(t.len(), 2);
        assert_eq!(t.get(1, "target"), Some(&Cell::Int(4)));
        assert_eq!(t.get(0, "missing"), None);

        let sources: Vec<_> = t.column("source").unwrap().cloned().collect();
        assert_eq!(sources, vec![Cell::Int(1), Cell::Int(2)]);
    }

    #[test]
    fn add_computed_column() {
        let mut t = Table::new(["id"]);
        for id in [1u64, 3] {
            t.push_row(vec![Cell::Int(id)]);
        }
        t.add_column("odd", |row| Cell::Bool(row[0].as_int().is_some_and(|n| n % 2 == 1)));

        assert_eq!(t.columns(), ["id", "odd"]);
        assert_eq!(t.rows(), [vec![Cell::Int(1), Cell::Bool(true)], vec![Cell::Int(3), Cell::Bool(true)]]);
    }
}
