use crate::config::types::{Config, CrawlConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the landing URL and every structural selector
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.landing_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid landing-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "landing-url must use http or https, got '{}'",
            config.landing_url
        )));
    }

    validate_selector("facility-list-selector", &config.facility_list_selector)?;
    validate_selector("reveal-control-selector", &config.reveal_control_selector)?;
    validate_selector("document-links-selector", &config.document_links_selector)?;

    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.retries < 1 {
        return Err(ConfigError::Validation(format!(
            "retries must be >= 1, got {}",
            config.retries
        )));
    }

    let extension = config.document_extension.as_str();
    if extension.is_empty() || extension.contains(['/', '\\', '.']) {
        return Err(ConfigError::Validation(format!(
            "document-extension must be a bare extension such as 'pdf', got '{}'",
            extension
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.report_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "report-dir cannot be empty".to_string(),
        ));
    }

    if config.ledger_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "ledger-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!("{} cannot be empty", name)));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {}", name, selector, e)))
}
