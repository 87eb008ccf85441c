use anyhow::Result;
use log::{debug, info};
use std::io::Write;

use crate::composite::Record;

/// Encodes records as JSON lines: one JSON object per record, keyed by field name.
pub struct JsonLinesFormatter {
    pretty: bool,
}

impl JsonLinesFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Write `records` to `out`, returning the number of bytes written.
    pub fn convert<W: Write>(&self, records: &[Record], mut out: W) -> Result<u64> {
        let mut bytes_written = 0u64;
        for (i, record) in records.iter().enumerate() {
            let line = if self.pretty {
                serde_json::to_vec_pretty(record)?
            } else {
                serde_json::to_vec(record)?
            };
            out.write_all(&line)?;
            out.write_all(b"\n")?;
            bytes_written += line.len() as u64 + 1;
            debug!("wrote record {} ({} bytes)", i, line.len());
        }
        out.flush()?;

        info!("Wrote {} records as JSON lines", records.len());
        Ok(bytes_written)
    }
}
