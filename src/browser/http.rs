//! Static-DOM browser engine backed by reqwest and scraper
//!
//! Each page load is a plain GET. The response body is treated as the page's
//! DOM, so anything a site builds client-side is invisible to this engine.
//! Controls that only toggle visibility of markup already present in the
//! served document (tabs, accordions, postback links) are therefore no-ops
//! when clicked.

use crate::browser::{Browser, ElementHandle, LaunchOptions, Page};
use crate::{LtcError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Browser engine issuing plain HTTP requests
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    /// Starts the engine on top of an existing HTTP client
    pub fn launch(client: Client, options: LaunchOptions) -> Self {
        if !options.headless {
            tracing::warn!("The static page engine has no window; running headless");
        }
        tracing::debug!(
            "Launched static page engine (user agent: {})",
            options.user_agent
        );
        Self { client }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(HttpPage::new(self.client.clone())))
    }

    async fn close(&self) -> Result<()> {
        tracing::debug!("Static page engine closed");
        Ok(())
    }
}

/// A page of the static engine
#[derive(Debug)]
pub struct HttpPage {
    client: Client,
    url: Option<Url>,
    body: Option<String>,
}

impl HttpPage {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: None,
            body: None,
        }
    }

    /// Creates a page with a document already loaded
    pub fn from_html(client: Client, url: Url, html: impl Into<String>) -> Self {
        Self {
            client,
            url: Some(url),
            body: Some(html.into()),
        }
    }

    fn loaded(&self) -> Result<(&Url, &str)> {
        match (&self.url, &self.body) {
            (Some(url), Some(body)) => Ok((url, body.as_str())),
            _ => Err(LtcError::PageNotLoaded),
        }
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        let target = Url::parse(url)?;

        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|source| LtcError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LtcError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|source| LtcError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::trace!("Loaded {} ({} bytes)", final_url, body.len());
        self.url = Some(final_url);
        self.body = Some(body);
        Ok(())
    }

    fn url(&self) -> Option<&str> {
        self.url.as_ref().map(Url::as_str)
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let (base_url, body) = self.loaded()?;
        select_elements(body, base_url, selector)
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        let (base_url, body) = self.loaded()?;

        let current = select_elements(body, base_url, &element.selector)?
            .into_iter()
            .nth(element.index);
        if current.as_ref() != Some(element) {
            return Err(LtcError::Browser(format!(
                "element {} of '{}' is no longer attached to the page",
                element.index, element.selector
            )));
        }

        let target = element
            .href
            .as_deref()
            .and_then(|href| navigable_target(base_url, href));
        match target {
            Some(target) => {
                tracing::trace!("Click follows link to {}", target);
                self.goto(target.as_str()).await
            }
            None => {
                tracing::trace!(
                    "Click on '{}' stays on the current document",
                    element.selector
                );
                Ok(())
            }
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Runs `selector` against `html` and snapshots every match
fn select_elements(html: &str, base_url: &Url, selector: &str) -> Result<Vec<ElementHandle>> {
    let parsed = Selector::parse(selector).map_err(|e| LtcError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let elements = document
        .select(&parsed)
        .enumerate()
        .map(|(index, element)| ElementHandle {
            selector: selector.to_string(),
            index,
            text: collapse_whitespace(element.text()),
            href: element
                .value()
                .attr("href")
                .map(|href| resolve_href(base_url, href)),
        })
        .collect();

    Ok(elements)
}

/// Joins text nodes the way rendered text reads: single spaces, trimmed
fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves an href against the page URL; unresolvable values are kept verbatim
fn resolve_href(base_url: &Url, href: &str) -> String {
    let href = href.trim();
    match base_url.join(href) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Returns the URL a click would load, or None when it stays on the document
fn navigable_target(current: &Url, href: &str) -> Option<Url> {
    let target = Url::parse(href).ok()?;
    if target.scheme() != "http" && target.scheme() != "https" {
        return None;
    }

    let mut without_fragment = target.clone();
    without_fragment.set_fragment(None);
    let mut current = current.clone();
    current.set_fragment(None);
    if without_fragment == current {
        return None;
    }

    Some(target)
}
