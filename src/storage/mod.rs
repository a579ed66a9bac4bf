//! Storage module for the run's durable record of retrieved documents
//!
//! Every processed document produces one [`Record`]. Records are streamed into
//! a [`RecordLedger`] as they are produced, so a run that dies part way keeps
//! everything written up to that point.

mod ledger;

pub use ledger::{read_ledger, LedgerContents, RecordLedger};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while writing or reading the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error while {context}: {source}")]
    Io {
        context: &'static str,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Malformed ledger at byte {offset}: {message}")]
    Parse { offset: usize, message: String },
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// One retrieved, or already present, document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Where the document was (or would have been) downloaded from
    pub uri: String,

    /// Sanitized facility name, also the facility's directory name
    pub home: String,

    /// Declared document title
    pub title: String,

    /// Number of earlier records this run with the same home and title
    pub instance: u32,
}
