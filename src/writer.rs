//! High-level API for writing parsed records.

use crate::composite::Record;
use crate::error::{Error, Result};
use crate::formats::json::JsonLinesFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writer for outputting parsed records as JSON lines.
///
/// Each record becomes one JSON object whose keys are the field names, in schema
/// order. Nested fields become nested objects and array fields become JSON arrays.
///
/// # Examples
///
/// ```no_run
/// use dict_parser::{JsonLinesWriter, RecordStream};
///
/// let mut stream = RecordStream::with_header("data.txt", "header.txt")?;
/// stream.parse_file()?;
///
/// JsonLinesWriter::new("records.jsonl").write(stream.records())?;
/// # Ok::<(), dict_parser::Error>(())
/// ```
pub struct JsonLinesWriter {
    output_path: PathBuf,
    pretty: bool,
}

impl JsonLinesWriter {
    /// Create a writer for the file at `output_path`. Parent directories are
    /// created on write.
    pub fn new<P: AsRef<Path>>(output_path: P) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
            pretty: false,
        }
    }

    /// Pretty-print each record. The output is then no longer one line per record.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Write the records, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write(self, records: &[Record]) -> Result<()> {
        self.write_with_stats(records).map(|_| ())
    }

    /// Write the records and return statistics about the write operation.
    pub fn write_with_stats(self, records: &[Record]) -> Result<WriteStats> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.output_path)?;
        write_json_lines(BufWriter::new(file), records, self.pretty)
    }
}

/// Write records as JSON lines to any writer, e.g. standard output.
pub fn write_json_lines<W: Write>(out: W, records: &[Record], pretty: bool) -> Result<WriteStats> {
    let num_bytes = JsonLinesFormatter::new(pretty)
        .convert(records, out)
        .map_err(|e| Error::Output(e.to_string()))?;

    Ok(WriteStats {
        num_records: records.len(),
        num_bytes,
    })
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStats {
    /// Total number of records written
    pub num_records: usize,
    /// Total number of bytes written
    pub num_bytes: u64,
}

impl WriteStats {
    /// Get a human-readable summary of the write operation.
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} records ({} bytes)",
            self.num_records, self.num_bytes
        )
    }
}
