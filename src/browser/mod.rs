//! Browser automation seam
//!
//! The crawler only needs a handful of capabilities from a browser engine:
//! open and close isolated pages, navigate, query elements by selector, read
//! an element's text and link, and click it. Those are captured by the
//! [`Browser`] and [`Page`] traits so that any engine, or a test double, can
//! sit underneath the crawl.
//!
//! [`HttpBrowser`] is the built-in engine. It renders pages as served, without
//! a script runtime.

mod http;
#[cfg(test)]
pub(crate) mod testing;

pub use http::{HttpBrowser, HttpPage};

use crate::config::BrowserConfig;
use crate::Result;
use async_trait::async_trait;

/// Launch options handed to an engine
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,

    /// Collect in-page console output for relaying
    pub relay_console: bool,

    /// Launch/connect timeout
    pub launch_timeout: std::time::Duration,

    /// User agent presented to the site
    pub user_agent: String,
}

impl From<&BrowserConfig> for LaunchOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            headless: config.headless,
            relay_console: config.relay_console,
            launch_timeout: config.launch_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// A snapshot of one element matched by a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Selector the element was matched by
    pub selector: String,

    /// Position of the element among the selector's matches, in DOM order
    pub index: usize,

    /// Rendered text, whitespace collapsed and trimmed
    pub text: String,

    /// Link target resolved against the page URL, if the element has one
    pub href: Option<String>,
}

/// A running browser engine
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a new isolated page
    async fn new_page(&self) -> Result<Box<dyn Page>>;

    /// Shuts the engine down
    async fn close(&self) -> Result<()>;
}

/// One page (tab) of a browser engine
#[async_trait]
pub trait Page: Send + Sync {
    /// Loads `url` into the page; failures are returned as errors
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// URL of the currently loaded document, if any
    fn url(&self) -> Option<&str>;

    /// Returns every element matching `selector`, in DOM order
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// Returns the first element matching `selector`
    async fn query(&self, selector: &str) -> Result<Option<ElementHandle>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    /// Simulates a user click on a previously queried element
    async fn click(&mut self, element: &ElementHandle) -> Result<()>;

    /// Takes the console messages emitted since the last call
    fn drain_console(&mut self) -> Vec<String> {
        Vec::new()
    }

    /// Releases the page
    async fn close(self: Box<Self>) -> Result<()>;
}
