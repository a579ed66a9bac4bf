//! Output module for reporting what a run did

use chrono::{DateTime, Utc};

/// Counters describing one completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Facilities found on the landing page
    pub facilities_listed: usize,

    /// Facilities left after the resume filter
    pub facilities_selected: usize,

    /// Facilities whose documents were all processed
    pub facilities_completed: usize,

    /// Facilities given up on after every attempt failed, in crawl order
    pub facilities_abandoned: Vec<String>,

    /// Documents downloaded this run
    pub documents_fetched: u64,

    /// Records written to the ledger (downloaded plus already present)
    pub documents_recorded: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Documents recorded without downloading because they were already on disk
    pub fn documents_already_present(&self) -> u64 {
        self.documents_recorded.saturating_sub(self.documents_fetched)
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// The one line always shown at the end of a run
    pub fn retrieved_line(&self) -> String {
        format!("retrieved {} reports", self.documents_fetched)
    }
}

/// Prints the run summary to stdout
///
/// The retrieved count is always printed; the remaining counters only go to
/// the debug log.
pub fn print_summary(summary: &RunSummary) {
    println!("{}", summary.retrieved_line());

    tracing::debug!(
        "Homes: {} listed, {} selected, {} completed, {} abandoned",
        summary.facilities_listed,
        summary.facilities_selected,
        summary.facilities_completed,
        summary.facilities_abandoned.len()
    );
    tracing::debug!(
        "Documents: {} recorded, {} already present, finished in {}s",
        summary.documents_recorded,
        summary.documents_already_present(),
        summary.duration_seconds()
    );
    for name in &summary.facilities_abandoned {
        tracing::debug!("  abandoned: {}", name);
    }
}
