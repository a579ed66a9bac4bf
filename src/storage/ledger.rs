//! Streaming JSON ledger of retrieved documents
//!
//! On disk the ledger is a single JSON array. The opening bracket is written
//! when the ledger is created, each record is appended (comma separated,
//! pretty printed, newline terminated) and flushed immediately, and the
//! closing bracket is written by [`RecordLedger::finalize`].
//!
//! A run that ends abnormally leaves the array unterminated. [`read_ledger`]
//! reads both shapes back.

use crate::storage::{LedgerError, LedgerResult, Record};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only writer for one run's ledger file
#[derive(Debug)]
pub struct RecordLedger {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl RecordLedger {
    /// Creates (or truncates) the ledger file and writes the opening bracket
    pub fn create(path: &Path) -> LedgerResult<Self> {
        let file = File::create(path).map_err(|source| LedgerError::Io {
            context: "creating the ledger",
            source,
        })?;

        let mut ledger = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        };
        ledger.write_flushed(b"[\n", "writing the opening bracket")?;

        tracing::debug!("Ledger opened at {}", path.display());
        Ok(ledger)
    }

    /// Appends one record and flushes it to disk
    pub fn append(&mut self, record: &Record) -> LedgerResult<()> {
        let mut entry = Vec::new();
        if self.written > 0 {
            entry.push(b',');
        }
        serde_json::to_writer_pretty(&mut entry, record)?;
        entry.push(b'\n');

        self.write_flushed(&entry, "appending a record")?;
        self.written += 1;

        tracing::trace!(
            "Ledger record {}: {} / {} #{}",
            self.written,
            record.home,
            record.title,
            record.instance
        );
        Ok(())
    }

    /// Number of records appended so far
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Writes the closing bracket and syncs the file, returning the record count
    pub fn finalize(mut self) -> LedgerResult<u64> {
        self.write_flushed(b"]\n", "writing the closing bracket")?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|source| LedgerError::Io {
                context: "syncing the ledger",
                source,
            })?;

        tracing::debug!(
            "Ledger {} finalized with {} records",
            self.path.display(),
            self.written
        );
        Ok(self.written)
    }

    fn write_flushed(&mut self, bytes: &[u8], context: &'static str) -> LedgerResult<()> {
        self.writer
            .write_all(bytes)
            .and_then(|_| self.writer.flush())
            .map_err(|source| LedgerError::Io { context, source })
    }
}

/// Records read back from a ledger file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerContents {
    pub records: Vec<Record>,

    /// Whether the closing bracket was present
    pub complete: bool,
}

/// Reads a ledger, accepting an unterminated array left by an aborted run
///
/// A record cut off part way through is dropped; every record before it is
/// returned.
pub fn read_ledger(path: &Path) -> LedgerResult<LedgerContents> {
    let text = std::fs::read_to_string(path).map_err(|source| LedgerError::Io {
        context: "reading the ledger",
        source,
    })?;
    parse_ledger(&text)
}

fn parse_ledger(text: &str) -> LedgerResult<LedgerContents> {
    let bytes = text.as_bytes();
    let mut pos = skip_whitespace(bytes, 0);

    if bytes.get(pos) != Some(&b'[') {
        return Err(LedgerError::Parse {
            offset: pos,
            message: "missing opening bracket".to_string(),
        });
    }
    pos += 1;

    let mut records = Vec::new();
    loop {
        pos = skip_whitespace(bytes, pos);
        match bytes.get(pos) {
            None => break,
            Some(b']') => {
                let end = skip_whitespace(bytes, pos + 1);
                if end != bytes.len() {
                    return Err(LedgerError::Parse {
                        offset: end,
                        message: "trailing data after closing bracket".to_string(),
                    });
                }
                return Ok(LedgerContents {
                    records,
                    complete: true,
                });
            }
            Some(b',') if !records.is_empty() => {
                pos = skip_whitespace(bytes, pos + 1);
            }
            Some(_) if records.is_empty() => {}
            Some(_) => {
                return Err(LedgerError::Parse {
                    offset: pos,
                    message: "expected ',' between records".to_string(),
                });
            }
        }

        let mut stream = serde_json::Deserializer::from_str(&text[pos..]).into_iter::<Record>();
        match stream.next() {
            Some(Ok(record)) => {
                records.push(record);
                pos += stream.byte_offset();
            }
            Some(Err(e)) if e.is_eof() => break,
            Some(Err(e)) => {
                return Err(LedgerError::Parse {
                    offset: pos,
                    message: e.to_string(),
                })
            }
            None => break,
        }
    }

    Ok(LedgerContents {
        records,
        complete: false,
    })
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}
