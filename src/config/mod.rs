//! Configuration module for LTC-Reports
//!
//! Built-in defaults target the Ontario LTC public reporting site. A TOML file
//! can override any of them, and command-line flags override the file.
//!
//! # Example
//!
//! ```no_run
//! use ltc_reports::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ltc-reports.toml")).unwrap();
//! println!("Reports go to: {}", config.output.report_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlConfig, OutputConfig, SiteConfig, DEFAULT_LANDING_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
