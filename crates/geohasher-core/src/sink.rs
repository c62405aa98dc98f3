//! Tabular output sinks
//!
//! A sink receives one header row followed by data rows. [`CsvSink`] writes a
//! CSV file; [`MemorySink`] keeps rows in memory for tests and previews.

use crate::error::{GeohasherError, Result};
use crate::models::OutputRow;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination for (headers, rows) tables
pub trait RowSink {
    /// Write the header row
    fn write_header(&mut self, headers: &[String]) -> Result<()>;

    /// Write one data row
    fn write_row(&mut self, values: &[String]) -> Result<()>;

    /// Flush buffered output
    fn finish(&mut self) -> Result<()>;
}

/// Write a complete table to a sink.
///
/// The header is only written when there is at least one row, so an empty
/// result leaves an empty file behind. Returns the number of data rows written.
pub fn write_table<S: RowSink + ?Sized>(
    sink: &mut S,
    headers: &[String],
    rows: &[OutputRow],
) -> Result<usize> {
    if !rows.is_empty() {
        sink.write_header(headers)?;
        for row in rows {
            sink.write_row(&row.values())?;
        }
    }
    sink.finish()?;

    tracing::debug!("Wrote {} rows", rows.len());
    Ok(rows.len())
}

/// CSV sink built on the `csv` crate
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    path: PathBuf,
}

impl CsvSink<File> {
    /// Create (or truncate) a CSV file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = csv::Writer::from_path(&path).map_err(|e| sink_error(&path, e))?;
        Ok(Self { writer, path })
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap an arbitrary writer; `label` is used in error messages
    pub fn from_writer(writer: W, label: impl Into<PathBuf>) -> Self {
        Self { writer: csv::Writer::from_writer(writer), path: label.into() }
    }

    /// Consume the sink and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        let path = self.path;
        self.writer.into_inner().map_err(|e| GeohasherError::SinkWrite {
            path,
            reason: e.error().to_string(),
        })
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        self.writer.write_record(headers).map_err(|e| sink_error(&self.path, e))
    }

    fn write_row(&mut self, values: &[String]) -> Result<()> {
        self.writer.write_record(values).map_err(|e| sink_error(&self.path, e))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| GeohasherError::SinkWrite {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

fn sink_error(path: &Path, error: csv::Error) -> GeohasherError {
    GeohasherError::SinkWrite { path: path.to_path_buf(), reason: error.to_string() }
}

/// In-memory sink
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSink for MemorySink {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        self.headers = Some(headers.to_vec());
        Ok(())
    }

    fn write_row(&mut self, values: &[String]) -> Result<()> {
        self.rows.push(values.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec!["name".to_string(), "geohash".to_string()]
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        let rows = vec![
            OutputRow::new("0", vec!["Ubud".to_string()], "qw3"),
            OutputRow::new("0", vec!["Ubud".to_string()], "qw6"),
        ];

        let written = write_table(&mut sink, &headers(), &rows).unwrap();

        assert_eq!(written, 2);
        assert_eq!(sink.headers, Some(headers()));
        assert_eq!(sink.rows[1], vec!["Ubud", "qw6"]);
        assert!(sink.finished);
    }

    #[test]
    fn test_empty_table_writes_no_header() {
        let mut sink = MemorySink::new();
        let written = write_table(&mut sink, &headers(), &[]).unwrap();

        assert_eq!(written, 0);
        assert!(sink.headers.is_none());
        assert!(sink.finished);
    }

    #[test]
    fn test_csv_sink_quotes_fields() {
        let mut sink = CsvSink::from_writer(Vec::new(), "memory");
        let rows = vec![OutputRow::new("0", vec!["Denpasar, Bali".to_string()], "qw3")];

        write_table(&mut sink, &headers(), &rows).unwrap();
        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(text, "name,geohash\n\"Denpasar, Bali\",qw3\n");
    }

    #[test]
    fn test_csv_sink_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::create(&path).unwrap();
        let rows = vec![OutputRow::new("0", vec!["a".to_string()], "s00")];
        write_table(&mut sink, &headers(), &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["name,geohash", "a,s00"]);
    }

    #[test]
    fn test_csv_sink_unwritable_path() {
        let result = CsvSink::create("/nonexistent-dir/out.csv");
        assert!(matches!(result, Err(GeohasherError::SinkWrite { .. })));
    }
}
