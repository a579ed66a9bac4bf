//! In-memory browser double for unit tests

use crate::browser::{Browser, ElementHandle, HttpPage, Page};
use crate::{LtcError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

/// Serves fixed HTML per URL; URLs it does not know fail to load
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    pages: Arc<HashMap<String, String>>,
    console: Arc<Vec<String>>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub visits: Arc<Mutex<Vec<String>>>,
}

impl FakeBrowser {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Every page emits these console messages once loaded
    pub fn with_console(mut self, messages: &[&str]) -> Self {
        self.console = Arc::new(messages.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn open_pages(&self) -> usize {
        self.opened.load(Ordering::SeqCst) - self.closed.load(Ordering::SeqCst)
    }

    pub fn visits_to(&self, url: &str) -> usize {
        self.visits
            .lock()
            .unwrap()
            .iter()
            .filter(|visited| visited.as_str() == url)
            .count()
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            browser: self.clone(),
            current: None,
            console: Vec::new(),
        }))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

pub struct FakePage {
    browser: FakeBrowser,
    current: Option<HttpPage>,
    console: Vec<String>,
}

impl FakePage {
    fn current(&self) -> Result<&HttpPage> {
        self.current.as_ref().ok_or(LtcError::PageNotLoaded)
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.browser.visits.lock().unwrap().push(url.to_string());
        let html = self
            .browser
            .pages
            .get(url)
            .ok_or_else(|| LtcError::Browser(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)))?;
        self.current = Some(HttpPage::from_html(Client::new(), Url::parse(url)?, html.clone()));
        self.console.extend(self.browser.console.iter().cloned());
        Ok(())
    }

    fn url(&self) -> Option<&str> {
        self.current.as_ref().and_then(|page| page.url())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.current()?.query_all(selector).await
    }

    async fn click(&mut self, _element: &ElementHandle) -> Result<()> {
        self.current().map(|_| ())
    }

    fn drain_console(&mut self) -> Vec<String> {
        std::mem::take(&mut self.console)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.browser.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
