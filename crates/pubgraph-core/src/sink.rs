//! Output sink: tab-separated table writer with atomic tmp→rename

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::table::{Cell, Table};

/// Buffered tab-separated writer with atomic tmp→rename
pub struct TsvSink {
    writer: csv::Writer<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    width: usize,
    row_count: usize,
}

impl std::fmt::Debug for TsvSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsvSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl TsvSink {
    /// Create a new sink writing the header to a temporary file
    pub fn new(output_dir: &Path, filename: &str, columns: &[String]) -> io::Result<Self> {
        let final_path = output_dir.join(filename);
        let tmp_path = output_dir.join(format!("{filename}.tmp"));

        // Clean up stale tmp file
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        let file = File::create(&tmp_path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(file);
        writer.write_record(columns).map_err(io::Error::other)?;

        Ok(Self {
            writer,
            tmp_path,
            final_path,
            width: columns.len(),
            row_count: 0,
        })
    }

    /// Write one row
    pub fn write_row(&mut self, row: &[Cell]) -> io::Result<()> {
        if row.len() != self.width {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("row has {} cells, header has {}", row.len(), self.width),
            ));
        }
        self.row_count += 1;
        self.writer
            .write_record(row.iter().map(|c| c.render().into_owned()))
            .map_err(io::Error::other)
    }

    /// Finalize: flush and atomically rename tmp → final
    pub fn finalize(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        fs::rename(&self.tmp_path, &self.final_path)?;
        Ok(self.row_count)
    }
}

/// Write a whole table as `<output_dir>/<filename>`. Returns rows written.
pub fn write_table(output_dir: &Path, filename: &str, table: &Table) -> io::Result<usize> {
    let mut sink = TsvSink::new(output_dir, filename, table.columns())?;
    for row in table.rows() {
        sink.write_row(row)?;
    }
    let rows = sink.finalize()?;
    log::debug!("{filename}: {rows} rows");
    Ok(rows)
}

/// Read a tab-separated file with a header row back into a table.
///
/// Types are not recovered: non-empty cells come back as `Str`, empty ones as `Null`.
pub fn read_table(path: &Path) -> io::Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .map_err(io::Error::other)?;

    let headers = reader.headers().map_err(io::Error::other)?.clone();
    let mut table = Table::new(headers.iter());

    for record in reader.records() {
        let record = record.map_err(io::Error::other)?;
        let row = record
            .iter()
            .map(|s| if s.is_empty() { Cell::Null } else { Cell::from(s) })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Remove stale .tmp files in the output directory
pub fn cleanup_tmp_files(output_dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
