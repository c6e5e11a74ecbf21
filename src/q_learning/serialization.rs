//! Plain-text Q-table files.
//!
//! ```text
//! # state action value confidence
//! 0 0 0.250000000000000 0.010000000000000
//! 1 1 0.500000000000000 0.010000000000000
//! ```
//!
//! Lines starting with `#` are comments, and a leading header line without
//! `#` is skipped too. After that, reading stops at the first line that is
//! not a well-formed quadruple; everything read up to that point is kept.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use tracing::{debug, error, warn};

use crate::{
    Error, Result,
    q_learning::q_table::{QEntry, QStore},
};

pub const TABLE_HEADER: &str = "# state action value confidence";

/// Digits after the decimal point written for values and confidences.
pub const TABLE_PRECISION: usize = 15;

fn parse_entry(line: &str) -> Option<QEntry> {
    let mut tokens = line.split_whitespace();
    let state = tokens.next()?.parse().ok()?;
    let action = tokens.next()?.parse().ok()?;
    let value = tokens.next()?.parse().ok()?;
    let confidence = tokens.next()?.parse().ok()?;
    Some(QEntry::new(state, action, value, confidence))
}

impl QStore {
    /// Parse a table from a reader. Never fails: read errors and malformed
    /// lines end the scan. The first content line may be a bare header.
    pub fn read_from<R: BufRead>(reader: R) -> Self {
        let mut entries = Vec::new();
        let mut seen_content = false;
        for (number, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = number + 1, error = %e, "q-table read interrupted");
                    break;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let first_content = !seen_content;
            seen_content = true;
            match parse_entry(trimmed) {
                Some(entry) => entries.push(entry),
                None if first_content => {
                    debug!(line = number + 1, content = trimmed, "q-table header skipped");
                }
                None => {
                    debug!(line = number + 1, content = trimmed, "q-table scan stopped");
                    break;
                }
            }
        }
        QStore::from_entries(entries)
    }

    /// Load a table file. A missing or unreadable file is logged and yields
    /// an empty table.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => Self::read_from(BufReader::new(file)),
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot open q-table file");
                QStore::new()
            }
        }
    }

    /// Write the header and one line per entry.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "{TABLE_HEADER}")?;
        for entry in self.entries() {
            writeln!(
                writer,
                "{} {} {:.prec$} {:.prec$}",
                entry.state,
                entry.action,
                entry.value,
                entry.confidence,
                prec = TABLE_PRECISION
            )?;
        }
        writer.flush()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::io(format!("create q-table file {}", path.display()), e))?;
        self.write_to(BufWriter::new(file))
            .map_err(|e| Error::io(format!("write q-table file {}", path.display()), e))
    }
}
