//! Command-line interface for the dictionary parser.
//!
//! Parses a data file against the schema described by a header file and writes the
//! parsed records as JSON lines.

use anyhow::Result;
use clap::Parser;
use dict_parser::{writer, JsonLinesWriter, RecordStreamBuilder};
use log::{info, LevelFilter};
use std::io;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Parse delimited dictionary files into typed records",
    long_about = "Parses each line of a dictionary data file against a schema read from a header file.\n\n\
                  The header holds one tab-separated line of field type names such as\n\
                  Field<string>, Field<uint32> or ArrayField<int>. Parsed records are written as JSON lines."
)]
struct Args {
    /// Data file with one record per line
    #[arg(value_name = "DATA")]
    data: PathBuf,

    /// Header file listing the field type of every column
    #[arg(long, value_name = "HEADER")]
    header: PathBuf,

    /// Delimiter between record fields
    #[arg(short, long, default_value = "\t")]
    delimiter: String,

    /// Fail if the header names an unknown field type
    #[arg(long)]
    strict_header: bool,

    /// Write JSON lines to this file instead of standard output
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Log every field failure
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp(None)
        .init();

    let start_time = Instant::now();
    info!("📄 Processing: {}", args.data.display());
    info!("   ├─ Header: {}", args.header.display());

    let mut stream = RecordStreamBuilder::new()
        .header_file(&args.header)
        .delimiter(args.delimiter.as_str())
        .strict_header(args.strict_header)
        .build(&args.data)?;

    let t0 = Instant::now();
    let stats = stream.parse_file()?;
    info!("   ├─ {} in {:.2?}", stats.summary(), t0.elapsed());

    let t1 = Instant::now();
    let write_stats = match &args.output {
        Some(path) => JsonLinesWriter::new(path).write_with_stats(stream.records())?,
        None => writer::write_json_lines(io::stdout().lock(), stream.records(), false)?,
    };
    info!("   ├─ {} in {:.2?}", write_stats.summary(), t1.elapsed());
    info!("   └─ ✓ Total time: {:.2?}", start_time.elapsed());

    Ok(())
}
