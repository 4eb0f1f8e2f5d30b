//! Per-identifier document cache
//!
//! One file per identifier, `<id>.xml`, holding the whitespace-trimmed raw
//! document. Presence of the file is the only hit signal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::record::Pmid;

#[derive(Debug, Clone)]
pub struct DocumentCache {
    dir: PathBuf,
}

impl DocumentCache {
    /// Open (creating if needed) a cache directory
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: Pmid) -> PathBuf {
        self.dir.join(format!("{id}.xml"))
    }

    pub fn contains(&self, id: Pmid) -> bool {
        self.path_for(id).exists()
    }

    pub fn read(&self, id: Pmid) -> io::Result<String> {
        let text = fs::read_to_string(self.path_for(id))?;
        Ok(text.trim().to_string())
    }

    /// Whole-file write; concurrent writers of the same id race harmlessly
    pub fn write(&self, id: Pmid, document: &str) -> io::Result<()> {
        fs::write(self.path_for(id), document.trim())
    }
}
