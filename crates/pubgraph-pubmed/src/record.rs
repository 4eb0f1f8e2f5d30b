//! Normalized per-identifier record

use pubgraph_core::Cell;

/// PubMed identifier
pub type Pmid = u64;

/// Prefix of the dynamic identifier columns (`article_id_doi`, ...)
pub const ARTICLE_ID_PREFIX: &str = "article_id_";

/// Prefix of the dynamic publication type flags (`publication_type_D016428`, ...)
pub const PUBLICATION_TYPE_PREFIX: &str = "publication_type_";

/// Insertion-ordered field map.
///
/// Setting an existing key replaces the value but keeps its position, so the
/// column order of a record is the order in which fields were first produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Cell)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Cell>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Title,
    Abstract,
}

impl TextKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Abstract => "abstract",
        }
    }
}

impl std::fmt::Display for TextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One free-text segment of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub kind: TextKind,
    pub order: usize,
    pub content: String,
}

/// Metadata, texts and outgoing citations for one identifier.
///
/// Only [`crate::extract`] populates a record; once populated it is never
/// modified again.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: Pmid,
    fields: Fields,
    texts: Vec<TextSegment>,
    references: Vec<Pmid>,
    populated: bool,
}

impl Record {
    /// Empty, unpopulated record
    pub fn new(id: Pmid) -> Self {
        Self {
            id,
            fields: Fields::new(),
            texts: Vec::new(),
            references: Vec::new(),
            populated: false,
        }
    }

    pub(crate) fn populated(
        id: Pmid,
        fields: Fields,
        texts: Vec<TextSegment>,
        references: Vec<Pmid>,
    ) -> Self {
        Self {
            id,
            fields,
            texts,
            references,
            populated: true,
        }
    }

    pub fn id(&self) -> Pmid {
        self.id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn texts(&self) -> &[TextSegment] {
        &self.texts
    }

    pub fn references(&self) -> &[Pmid] {
        &self.references
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn title(&self) -> Option<&str> {
        self.texts
            .iter()
            .find(|t| t.kind == TextKind::Title)
            .map(|t| t.content.as_str())
    }
}
