//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a whole run:
//! - Opening the ledger and the report directory
//! - Loading the landing page and listing facilities
//! - Applying the resume filter
//! - Scraping, downloading and recording each facility, with bounded retry
//! - Finalizing the ledger and summarizing the run
//!
//! Facilities and their documents are processed strictly one after another;
//! instance numbering and ledger order depend on it.

use crate::browser::{Browser, HttpBrowser, LaunchOptions, Page};
use crate::config::Config;
use crate::crawler::discovery::{apply_resume_filter, discover_facilities};
use crate::crawler::fetcher::{build_http_client, DocumentFetcher};
use crate::crawler::naming::{document_filename, InstanceCounter};
use crate::crawler::navigation::{attempt_navigate, RetryPolicy};
use crate::crawler::scraper::{ensure_directory, relay_console, FacilityScraper};
use crate::output::RunSummary;
use crate::site::{Facility, SelectorSite, SiteAdapter};
use crate::storage::{Record, RecordLedger};
use crate::{LtcError, Result};
use chrono::Utc;

/// State owned by a single run
#[derive(Debug, Default)]
pub(crate) struct RunContext {
    instances: InstanceCounter,
    documents_fetched: u64,
    facilities_completed: usize,
    facilities_abandoned: Vec<String>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    browser: Box<dyn Browser>,
    site: Box<dyn SiteAdapter>,
    fetcher: DocumentFetcher,
}

impl Coordinator {
    pub fn new(
        config: Config,
        browser: Box<dyn Browser>,
        site: Box<dyn SiteAdapter>,
        fetcher: DocumentFetcher,
    ) -> Self {
        Self {
            config,
            browser,
            site,
            fetcher,
        }
    }

    /// Creates a coordinator using the built-in engine and the configured selectors
    pub fn from_config(config: Config) -> Result<Self> {
        let client = build_http_client(&config.browser)?;
        let browser = HttpBrowser::launch(client.clone(), LaunchOptions::from(&config.browser));
        let site = SelectorSite::new(config.site.clone());

        Ok(Self::new(
            config,
            Box::new(browser),
            Box::new(site),
            DocumentFetcher::new(client),
        ))
    }

    fn navigation_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.crawl.retries, self.config.crawl.retry_delay())
    }

    /// Runs the crawl from start to finish
    ///
    /// The ledger is created (truncating any previous one) before anything
    /// else happens and is finalized at the end. If the run aborts for any
    /// reason other than a ledger failure, the ledger is still finalized so it
    /// stays a valid array.
    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let ledger_path = &self.config.output.ledger_path;

        let mut ledger = RecordLedger::create(ledger_path).map_err(|e| {
            tracing::error!("IO error: opening records list {}: {}", ledger_path.display(), e);
            LtcError::from(e)
        })?;
        let mut context = RunContext::default();

        let crawled = self.crawl(&mut ledger, &mut context).await;

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close the browser: {}", e);
        }

        let (facilities_listed, facilities_selected) = match crawled {
            Ok(counts) => counts,
            Err(e) => {
                if !matches!(e, LtcError::Ledger(_)) {
                    if let Err(ledger_error) = ledger.finalize() {
                        tracing::error!(
                            "IO error: writing final character of records list: {}",
                            ledger_error
                        );
                    }
                }
                return Err(e);
            }
        };

        let documents_recorded = ledger.finalize().map_err(|e| {
            tracing::error!("IO error: writing final character of records list: {}", e);
            LtcError::from(e)
        })?;

        Ok(RunSummary {
            facilities_listed,
            facilities_selected,
            facilities_completed: context.facilities_completed,
            facilities_abandoned: context.facilities_abandoned,
            documents_fetched: context.documents_fetched,
            documents_recorded,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Lists, filters and processes facilities; returns (listed, selected) counts
    async fn crawl(
        &self,
        ledger: &mut RecordLedger,
        context: &mut RunContext,
    ) -> Result<(usize, usize)> {
        let report_dir = &self.config.output.report_dir;
        tracing::info!("Reports will be saved to {}", report_dir.display());
        ensure_directory(report_dir).await?;

        let mut landing = self.browser.new_page().await?;
        let listed = self.load_facility_list(landing.as_mut()).await;
        relay_console(landing.as_mut(), self.config.browser.relay_console);
        if let Err(e) = landing.close().await {
            tracing::warn!("Failed to close the landing page: {}", e);
        }
        let facilities = listed?;
        let facilities_listed = facilities.len();

        let selected = apply_resume_filter(facilities, self.config.crawl.start_at.as_deref());
        tracing::info!(
            "Processing {} of {} homes",
            selected.len(),
            facilities_listed
        );

        for facility in &selected {
            self.process_with_retry(facility, ledger, context).await?;
        }

        Ok((facilities_listed, selected.len()))
    }

    async fn load_facility_list(&self, page: &mut dyn Page) -> Result<Vec<Facility>> {
        let url = self.site.landing_url();
        tracing::debug!("loading {}", url);

        let policy = self.navigation_policy();
        if !attempt_navigate(page, url, policy).await {
            return Err(LtcError::LandingPageUnreachable {
                url: url.to_string(),
                attempts: policy.attempts,
            });
        }

        discover_facilities(&*page, self.site.as_ref()).await
    }

    /// Processes one facility, retrying the whole facility on failure
    ///
    /// Fatal errors end the run immediately. Any other error is retried after
    /// the full backoff; once attempts run out the facility is abandoned and
    /// whatever it already produced (directory, files, ledger records) stays.
    async fn process_with_retry(
        &self,
        facility: &Facility,
        ledger: &mut RecordLedger,
        context: &mut RunContext,
    ) -> Result<()> {
        let attempts = self.config.crawl.retries;

        for attempt in 1..=attempts {
            match self.process_facility(facility, ledger, context).await {
                Ok(()) => {
                    context.facilities_completed += 1;
                    return Ok(());
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Exception for {} ({}) on attempt {}/{}: {}",
                        facility.name,
                        facility.url,
                        attempt,
                        attempts,
                        e
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.config.crawl.retry_delay()).await;
                    }
                }
            }
        }

        tracing::error!(
            "Failed to retrieve information for {} after {} tries",
            facility.name,
            attempts
        );
        context.facilities_abandoned.push(facility.name.clone());
        Ok(())
    }

    /// Scrapes one facility, then fetches and records each document in order
    async fn process_facility(
        &self,
        facility: &Facility,
        ledger: &mut RecordLedger,
        context: &mut RunContext,
    ) -> Result<()> {
        let scraper = FacilityScraper::new(
            self.browser.as_ref(),
            self.site.as_ref(),
            &self.config.output.report_dir,
            self.navigation_policy(),
            self.config.crawl.settle_delay(),
        )
        .with_console_relay(self.config.browser.relay_console);

        let scraped = scraper.scrape(facility).await?;
        let extension = &self.config.crawl.document_extension;

        for document in &scraped.documents {
            let instance = context.instances.instance_of(&scraped.home, &document.title);
            let filename = document_filename(&document.title, instance, extension);
            let destination = scraped.directory.join(&filename);
            if destination.parent() != Some(scraped.directory.as_path()) {
                return Err(LtcError::UnsafeDocumentPath {
                    title: document.title.clone(),
                    directory: scraped.directory.display().to_string(),
                });
            }

            let outcome = self.fetcher.fetch(&document.href, &destination).await?;
            if outcome.was_downloaded() {
                context.documents_fetched += 1;
            }

            let record = Record {
                uri: document.href.clone(),
                home: scraped.home.clone(),
                title: document.title.clone(),
                instance,
            };
            context.instances.count(&record.home, &record.title);
            ledger.append(&record).map_err(|e| {
                tracing::error!("IO error: appending record to records list: {}", e);
                LtcError::from(e)
            })?;
        }

        Ok(())
    }
}

/// Runs the main crawl operation with the built-in engine
///
/// # Example
///
/// ```no_run
/// use ltc_reports::config::Config;
/// use ltc_reports::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_crawl(Config::default()).await?;
/// println!("retrieved {} reports", summary.documents_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<RunSummary> {
    let coordinator = Coordinator::from_config(config)?;
    coordinator.run().await
}
