//! Crawler module for directory traversal and document retrieval
//!
//! This module contains the core crawling logic, including:
//! - Page navigation with bounded retry
//! - Facility discovery and the resume filter
//! - Per-facility scraping of document links
//! - Collision-free document naming
//! - Idempotent, streaming document downloads
//! - Overall run coordination

mod coordinator;
mod discovery;
mod fetcher;
mod naming;
mod navigation;
mod scraper;

pub use coordinator::{run_crawl, Coordinator};
pub use discovery::{apply_resume_filter, discover_facilities};
pub use fetcher::{build_http_client, DocumentFetcher, FetchOutcome};
pub use naming::{document_filename, sanitize_home, sanitize_title, InstanceCounter};
pub use navigation::{attempt_navigate, RetryPolicy};
pub use scraper::{ensure_directory, relay_console, FacilityDocuments, FacilityScraper};
