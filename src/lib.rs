//! LTC-Reports: a resumable harvester of posted inspection reports
//!
//! This crate walks a public directory of long-term-care homes, visits each
//! home's detail page, reveals its list of inspection documents, downloads
//! every document into a per-home directory and keeps a streaming JSON ledger
//! of everything it retrieved.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod storage;

use thiserror::Error;

/// Main error type for LTC-Reports operations
#[derive(Debug, Error)]
pub enum LtcError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("No document is loaded in this page")]
    PageNotLoaded,

    #[error("Could not load {url} after {attempts} attempts")]
    NavigationExhausted { url: String, attempts: u32 },

    #[error("Could not load the directory landing page {url} after {attempts} attempts")]
    LandingPageUnreachable { url: String, attempts: u32 },

    #[error("No reveal control matching '{selector}' on {page}")]
    RevealControlMissing { page: String, selector: String },

    #[error("Document '{title}' would be saved outside {directory}")]
    UnsafeDocumentPath { title: String, directory: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] storage::LedgerError),
}

impl LtcError {
    /// Returns true if the error must end the run instead of being retried
    ///
    /// A broken ledger loses the only durable record of the run, and without
    /// the landing page there is nothing to crawl.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Ledger(_) | Self::LandingPageUnreachable { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for LTC-Reports operations
pub type Result<T> = std::result::Result<T, LtcError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use output::RunSummary;
pub use storage::{Record, RecordLedger};
