//! High-level API for parsing dictionary files line by line.

use log::{debug, error, info, warn};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::composite::{split_tokens, Record, RECORD_DELIMITER};
use crate::error::{Error, FieldError, Result};
use crate::registry::FieldTypeRegistry;

/// Creates the empty record each input line is parsed into.
pub type RecordBuilder = Box<dyn Fn() -> Record + Send + Sync>;

/// Parses a data file into one [`Record`] per line.
///
/// Each line is deserialized into a fresh record from the record builder. Lines
/// that fail are logged and dropped but still counted.
///
/// # Examples
///
/// ```no_run
/// use dict_parser::{ArrayField, Record, RecordStream, TypedField};
///
/// let mut stream = RecordStream::new("people.txt", || {
///     let mut record = Record::record();
///     let _ = record.add_field(TypedField::<String>::new("name"));
///     let _ = record.add_field(TypedField::<u32>::new("age"));
///     let _ = record.add_field(ArrayField::of::<String>("items"));
///     record
/// });
///
/// let stats = stream.parse_file()?;
/// println!("{}", stats.summary());
/// for record in stream.records() {
///     println!("{:?}", record.data::<String>("name"));
/// }
/// # Ok::<(), dict_parser::Error>(())
/// ```
pub struct RecordStream {
    data_path: PathBuf,
    record_builder: RecordBuilder,
    records: Vec<Record>,
    num_lines: u64,
    num_parsed_lines: u64,
}

impl RecordStream {
    /// Create a stream over `data_path` using an explicit schema.
    pub fn new<P, F>(data_path: P, record_builder: F) -> Self
    where
        P: AsRef<Path>,
        F: Fn() -> Record + Send + Sync + 'static,
    {
        Self::from_parts(data_path.as_ref().to_path_buf(), Box::new(record_builder))
    }

    /// Create a stream whose schema is read from `header_path` using the global
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceOpen`] if the header file cannot be opened.
    pub fn with_header<P, Q>(data_path: P, header_path: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        RecordStreamBuilder::new()
            .header_file(header_path)
            .build(data_path)
    }

    pub fn builder<'r>() -> RecordStreamBuilder<'r> {
        RecordStreamBuilder::new()
    }

    fn from_parts(data_path: PathBuf, record_builder: RecordBuilder) -> Self {
        Self {
            data_path,
            record_builder,
            records: Vec::new(),
            num_lines: 0,
            num_parsed_lines: 0,
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Parse every line of the data file, replacing any earlier results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceOpen`] if the data file cannot be opened, or
    /// [`Error::Io`] if it cannot be mapped. Malformed lines are not errors.
    pub fn parse_file(&mut self) -> Result<ParseStats> {
        self.clear();

        let file = File::open(&self.data_path).map_err(|source| Error::SourceOpen {
            path: self.data_path.clone(),
            source,
        })?;

        if file.metadata()?.len() == 0 {
            warn!("data file {} is empty", self.data_path.display());
            return Ok(self.stats());
        }

        let mmap = unsafe { Mmap::map(&file)? };
        let mut lines = mmap.split(|&byte| byte == b'\n').peekable();
        while let Some(line) = lines.next() {
            // a final newline does not start another line
            if line.is_empty() && lines.peek().is_none() {
                break;
            }
            match std::str::from_utf8(line) {
                Ok(line) => {
                    let _ = self.parse_line(line);
                }
                Err(err) => {
                    self.num_lines += 1;
                    error!("line {}: invalid UTF-8: {}", self.num_lines, err);
                }
            }
        }

        let stats = self.stats();
        info!("{}: {}", self.data_path.display(), stats.summary());
        Ok(stats)
    }

    /// Parse newline-separated records held in memory, replacing any earlier results.
    pub fn parse_str(&mut self, content: &str) -> ParseStats {
        self.clear();
        for line in content.lines() {
            let _ = self.parse_line(line);
        }
        self.stats()
    }

    /// Parse a single line and record the outcome.
    ///
    /// A trailing `\r` is ignored. On success the record is appended to
    /// [`records`](Self::records); on failure it is dropped.
    pub fn parse_line(&mut self, line: &str) -> std::result::Result<(), FieldError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        self.num_lines += 1;

        let mut record = (self.record_builder)();
        match record.deserialize(line) {
            Ok(()) => {
                self.records.push(record);
                self.num_parsed_lines += 1;
                Ok(())
            }
            Err(err) => {
                error!("parse {:?} error: {}", line, err);
                Err(err)
            }
        }
    }

    /// Forget all parsed records and counters.
    pub fn clear(&mut self) {
        self.records.clear();
        self.num_lines = 0;
        self.num_parsed_lines = 0;
    }

    /// Lines seen since the last reset, including failed ones.
    pub fn num_lines(&self) -> u64 {
        self.num_lines
    }

    pub fn num_parsed_lines(&self) -> u64 {
        self.num_parsed_lines
    }

    /// Successfully parsed records, in input order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn stats(&self) -> ParseStats {
        ParseStats {
            total_lines: self.num_lines,
            parsed_lines: self.num_parsed_lines,
        }
    }
}

/// Line counts from one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines read, including failed ones
    pub total_lines: u64,
    /// Lines that produced a record
    pub parsed_lines: u64,
}

impl ParseStats {
    pub fn failed_lines(&self) -> u64 {
        self.total_lines - self.parsed_lines
    }

    /// Get a human-readable summary of the parse.
    pub fn summary(&self) -> String {
        format!(
            "Parsed {} of {} line(s), {} failed",
            self.parsed_lines,
            self.total_lines,
            self.failed_lines()
        )
    }
}

/// Builder for configuring how a [`RecordStream`] obtains its schema.
///
/// A header file takes precedence over an explicit record builder.
///
/// # Examples
///
/// ```no_run
/// use dict_parser::{FieldTypeRegistry, RecordStreamBuilder};
///
/// let registry = FieldTypeRegistry::with_builtins();
/// let mut stream = RecordStreamBuilder::new()
///     .header_file("header.txt")
///     .registry(&registry)
///     .strict_header(true)
///     .build("data.txt")?;
/// stream.parse_file()?;
/// # Ok::<(), dict_parser::Error>(())
/// ```
pub struct RecordStreamBuilder<'r> {
    record_builder: Option<RecordBuilder>,
    header_path: Option<PathBuf>,
    delimiter: Option<String>,
    strict_header: bool,
    registry: Option<&'r FieldTypeRegistry>,
}

impl<'r> RecordStreamBuilder<'r> {
    /// Create a new stream builder with default options.
    pub fn new() -> Self {
        Self {
            record_builder: None,
            header_path: None,
            delimiter: None,
            strict_header: false,
            registry: None,
        }
    }

    /// Use an explicit schema. Ignored when a header file is set.
    pub fn record_builder<F>(mut self, record_builder: F) -> Self
    where
        F: Fn() -> Record + Send + Sync + 'static,
    {
        self.record_builder = Some(Box::new(record_builder));
        self
    }

    /// Read the schema from the first line of a header file.
    pub fn header_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.header_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Override the delimiter between record fields (tab by default).
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Fail the build if the header names an unregistered type.
    ///
    /// By default unknown types are skipped and the mismatch surfaces when the
    /// first line is parsed.
    pub fn strict_header(mut self, strict: bool) -> Self {
        self.strict_header = strict;
        self
    }

    /// Registry used to resolve header type names. Defaults to
    /// [`FieldTypeRegistry::global`].
    pub fn registry(mut self, registry: &'r FieldTypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build a stream over `data_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceOpen`] if the header file cannot be opened, or
    /// [`Error::Field`] for an unknown type in strict mode.
    pub fn build<P: AsRef<Path>>(self, data_path: P) -> Result<RecordStream> {
        let record_builder: RecordBuilder = match &self.header_path {
            Some(header_path) => {
                if self.record_builder.is_some() {
                    debug!("header file given, ignoring the supplied record builder");
                }
                let type_names = read_header(header_path)?;
                let registry = self.registry.unwrap_or_else(|| FieldTypeRegistry::global());
                let mut schema = if self.strict_header {
                    registry.build_record_strict(type_names.as_slice())?
                } else {
                    registry.build_record(type_names.as_slice())
                };
                if let Some(delimiter) = self.delimiter {
                    schema = schema.with_delimiter(delimiter);
                }
                Box::new(move || schema.clone())
            }
            None => {
                let inner: RecordBuilder = match self.record_builder {
                    Some(record_builder) => record_builder,
                    None => Box::new(Record::record),
                };
                match self.delimiter {
                    Some(delimiter) => {
                        Box::new(move || inner().with_delimiter(delimiter.as_str()))
                    }
                    None => inner,
                }
            }
        };

        Ok(RecordStream::from_parts(
            data_path.as_ref().to_path_buf(),
            record_builder,
        ))
    }
}

impl Default for RecordStreamBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the type names on the first line of a header file.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::SourceOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let first_line = BufReader::new(file).lines().next().transpose()?;
    let Some(line) = first_line else {
        warn!("header file {} is empty", path.display());
        return Ok(Vec::new());
    };

    let line = line.strip_suffix('\r').unwrap_or(&line);
    let type_names: Vec<String> = split_tokens(line, RECORD_DELIMITER)
        .into_iter()
        .map(str::to_string)
        .collect();
    debug!("header {}: {:?}", path.display(), type_names);
    Ok(type_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::TypedField;

    fn person() -> Record {
        let mut record = Record::record();
        record.add_field(TypedField::<String>::new("name")).unwrap();
        record.add_field(TypedField::<u32>::new("age")).unwrap();
        record
    }

    #[test]
    fn test_parse_str_counts_lines() {
        let mut stream = RecordStream::new("unused", person);
        let stats = stream.parse_str("zhang\t18\nli\tabc\n\nwang\t20\r\n");

        assert_eq!(stats.total_lines, 4);
        assert_eq!(stats.parsed_lines, 2);
        assert_eq!(stats.failed_lines(), 2);
        assert_eq!(stream.records().len(), 2);
        assert_eq!(stream.records()[1].data::<u32>("age"), Some(&20));
    }

    #[test]
    fn test_parse_line_reports_failure() {
        let mut stream = RecordStream::new("unused", person);
        assert!(stream.parse_line("zhang\t18").is_ok());
        assert!(matches!(
            stream.parse_line("zhang"),
            Err(FieldError::CountMismatch { .. })
        ));
        assert_eq!(stream.num_lines(), 2);
        assert_eq!(stream.num_parsed_lines(), 1);
    }

    #[test]
    fn test_builder_delimiter_override() {
        let mut stream = RecordStreamBuilder::new()
            .record_builder(person)
            .delimiter(",")
            .build("unused")
            .unwrap();
        stream.parse_str("zhang,18");
        assert_eq!(stream.num_parsed_lines(), 1);
    }

    #[test]
    fn test_default_builder_is_empty_record() {
        let mut stream = RecordStream::builder().build("unused").unwrap();
        stream.parse_str("\nx");
        assert_eq!(stream.num_lines(), 2);
        assert_eq!(stream.num_parsed_lines(), 1);
    }

    #[test]
    fn test_stats_summary() {
        let stats = ParseStats {
            total_lines: 3,
            parsed_lines: 2,
        };
        assert_eq!(stats.summary(), "Parsed 2 of 3 line(s), 1 failed");
    }
}
