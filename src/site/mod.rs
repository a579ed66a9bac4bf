//! Site adapters
//!
//! A site adapter knows where a particular directory's markup keeps the list
//! of facilities, the control revealing a facility's documents, and the
//! document links themselves. The crawl, retry and ledger logic only talks to
//! the [`SiteAdapter`] trait and never to selectors directly.

use crate::browser::{ElementHandle, Page};
use crate::config::SiteConfig;
use crate::{LtcError, Result};
use async_trait::async_trait;

/// A facility listed in the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    /// Name as displayed in the directory
    pub name: String,

    /// Absolute URL of the facility's detail page
    pub url: String,
}

/// A document posted on a facility's page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Displayed title
    pub title: String,

    /// Absolute download URL
    pub href: String,
}

/// Capabilities a site must provide to be crawled
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// URL of the page listing every facility
    fn landing_url(&self) -> &str;

    /// Extracts the facilities from the loaded landing page, in page order
    async fn locate_facility_list(&self, page: &dyn Page) -> Result<Vec<Facility>>;

    /// Finds the control that reveals a facility's documents
    async fn locate_reveal_control(&self, page: &dyn Page) -> Result<ElementHandle>;

    /// Extracts the revealed documents, in page order
    async fn locate_document_links(&self, page: &dyn Page) -> Result<Vec<Document>>;
}

/// Site adapter driven by the CSS selectors in [`SiteConfig`]
#[derive(Debug, Clone)]
pub struct SelectorSite {
    config: SiteConfig,
}

impl SelectorSite {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }
}

impl Default for SelectorSite {
    fn default() -> Self {
        Self::new(SiteConfig::default())
    }
}

#[async_trait]
impl SiteAdapter for SelectorSite {
    fn landing_url(&self) -> &str {
        &self.config.landing_url
    }

    async fn locate_facility_list(&self, page: &dyn Page) -> Result<Vec<Facility>> {
        let anchors = page.query_all(&self.config.facility_list_selector).await?;
        Ok(anchors
            .into_iter()
            .filter_map(|anchor| match anchor.href {
                Some(url) => Some(Facility {
                    name: anchor.text,
                    url,
                }),
                None => {
                    tracing::debug!("Skipping facility '{}' without a link", anchor.text);
                    None
                }
            })
            .collect())
    }

    async fn locate_reveal_control(&self, page: &dyn Page) -> Result<ElementHandle> {
        let selector = &self.config.reveal_control_selector;
        page.query(selector)
            .await?
            .ok_or_else(|| LtcError::RevealControlMissing {
                page: page.url().unwrap_or("<no page>").to_string(),
                selector: selector.clone(),
            })
    }

    async fn locate_document_links(&self, page: &dyn Page) -> Result<Vec<Document>> {
        let anchors = page.query_all(&self.config.document_links_selector).await?;
        Ok(anchors
            .into_iter()
            .filter_map(|anchor| match anchor.href {
                Some(href) => Some(Document {
                    title: anchor.text,
                    href,
                }),
                None => {
                    tracing::debug!("Skipping document '{}' without a link", anchor.text);
                    None
                }
            })
            .collect())
    }
}
