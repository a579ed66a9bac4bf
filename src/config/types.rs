use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default directory landing page of the Ontario LTC public reporting site
pub const DEFAULT_LANDING_URL: &str =
    "https://publicreporting.ltchomes.net/en-ca/Search_Selection.aspx";

/// Main configuration structure for LTC-Reports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Where the directory lives and how its markup is shaped
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// URL of the directory landing page listing every facility
    #[serde(rename = "landing-url")]
    pub landing_url: String,

    /// Selector matching one anchor per facility on the landing page
    #[serde(rename = "facility-list-selector")]
    pub facility_list_selector: String,

    /// Selector matching the control that reveals a facility's documents
    #[serde(rename = "reveal-control-selector")]
    pub reveal_control_selector: String,

    /// Selector matching one anchor per document once revealed
    #[serde(rename = "document-links-selector")]
    pub document_links_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            landing_url: DEFAULT_LANDING_URL.to_string(),
            facility_list_selector: "#ctl00_ContentPlaceHolder1_rsResults>ol>li>a".to_string(),
            reveal_control_selector: "#ctl00_ContentPlaceHolder1_aInspection".to_string(),
            document_links_selector: "div.divInspectionFileDataCol>a".to_string(),
        }
    }
}

/// Crawl pacing and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Attempts per navigation and per facility
    pub retries: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Delay after a navigation or click before querying the page (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Extension given to every stored document
    #[serde(rename = "document-extension")]
    pub document_extension: String,

    /// Only process facilities from the one with this exact name onwards
    #[serde(rename = "start-at")]
    pub start_at: Option<String>,
}

impl CrawlConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            retries: 5,
            retry_delay_ms: 1000,
            settle_delay_ms: 1000,
            document_extension: "pdf".to_string(),
            start_at: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory receiving one sub-directory per facility
    #[serde(rename = "report-dir")]
    pub report_dir: PathBuf,

    /// Path of the JSON record ledger
    #[serde(rename = "ledger-path")]
    pub ledger_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("reports"),
            ledger_path: PathBuf::from("ltc-records.json"),
        }
    }
}

/// Browser engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,

    /// Relay in-page console output to the process log
    #[serde(rename = "relay-console")]
    pub relay_console: bool,

    /// Engine launch/connect timeout (milliseconds)
    #[serde(rename = "launch-timeout-ms")]
    pub launch_timeout_ms: u64,

    /// User agent presented to the site
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl BrowserConfig {
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            relay_console: false,
            launch_timeout_ms: 100_000,
            user_agent: format!("ltc-reports/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
