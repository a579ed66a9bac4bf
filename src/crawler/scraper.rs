//! Per-facility page scraping
//!
//! For one facility this opens a fresh page, loads the facility's detail
//! page, reveals its document list, reads the document links and makes sure
//! the facility's report directory exists. The page is closed whether or not
//! scraping succeeded.

use crate::browser::{Browser, Page};
use crate::crawler::naming::sanitize_home;
use crate::crawler::navigation::{attempt_navigate, RetryPolicy};
use crate::site::{Document, Facility, SiteAdapter};
use crate::{LtcError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What scraping one facility produced
#[derive(Debug, Clone)]
pub struct FacilityDocuments {
    /// Sanitized facility name
    pub home: String,

    /// Directory the facility's documents are stored in
    pub directory: PathBuf,

    /// Documents in page order
    pub documents: Vec<Document>,
}

/// Scrapes facility pages through a browser and a site adapter
pub struct FacilityScraper<'a> {
    browser: &'a dyn Browser,
    site: &'a dyn SiteAdapter,
    report_dir: &'a Path,
    navigation: RetryPolicy,
    settle_delay: Duration,
    relay_console: bool,
}

impl<'a> FacilityScraper<'a> {
    pub fn new(
        browser: &'a dyn Browser,
        site: &'a dyn SiteAdapter,
        report_dir: &'a Path,
        navigation: RetryPolicy,
        settle_delay: Duration,
    ) -> Self {
        Self {
            browser,
            site,
            report_dir,
            navigation,
            settle_delay,
            relay_console: false,
        }
    }

    pub fn with_console_relay(mut self, relay_console: bool) -> Self {
        self.relay_console = relay_console;
        self
    }

    /// Scrapes one facility in its own page
    pub async fn scrape(&self, facility: &Facility) -> Result<FacilityDocuments> {
        tracing::debug!("Retrieving reports for {} ({})", facility.name, facility.url);

        let mut page = self.browser.new_page().await?;
        let result = self.scrape_in(page.as_mut(), facility).await;

        relay_console(page.as_mut(), self.relay_console);
        if let Err(e) = page.close().await {
            tracing::warn!("Failed to close the page for {}: {}", facility.name, e);
        }

        result
    }

    async fn scrape_in(&self, page: &mut dyn Page, facility: &Facility) -> Result<FacilityDocuments> {
        if !attempt_navigate(page, &facility.url, self.navigation).await {
            return Err(LtcError::NavigationExhausted {
                url: facility.url.clone(),
                attempts: self.navigation.attempts,
            });
        }
        tokio::time::sleep(self.settle_delay).await;

        let control = self.site.locate_reveal_control(&*page).await?;
        page.click(&control).await?;
        tokio::time::sleep(self.settle_delay).await;

        let documents = self.site.locate_document_links(&*page).await?;
        tracing::debug!("{} lists {} documents", facility.name, documents.len());

        let home = sanitize_home(&facility.name);
        let directory = self.report_dir.join(&home);
        ensure_directory(&directory).await?;

        Ok(FacilityDocuments {
            home,
            directory,
            documents,
        })
    }
}

/// Creates `directory` unless it already exists
pub async fn ensure_directory(directory: &Path) -> Result<()> {
    if directory.is_dir() {
        tracing::debug!("Directory {} already exists", directory.display());
        return Ok(());
    }
    tokio::fs::create_dir_all(directory).await?;
    Ok(())
}

/// Logs whatever the page printed to its console
pub fn relay_console(page: &mut dyn Page, enabled: bool) {
    if !enabled {
        return;
    }
    for message in page.drain_console() {
        tracing::info!("PAGE LOG {}", message);
    }
}
