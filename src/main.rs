//! LTC-Reports main entry point
//!
//! This is the command-line interface for the LTC inspection report harvester.

use clap::error::ErrorKind;
use clap::Parser;
use ltc_reports::config::{load_config_with_hash, Config};
use ltc_reports::crawler::run_crawl;
use ltc_reports::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE_LINE: &str =
    "ltc-reports [--help] [--repdir=DIR] [--startat=\"HOME NAME (all upper case)\"] [--verbose] [--agentconsole] [--nonheadless] [--config=FILE]";

/// LTC-Reports: harvest posted inspection reports
///
/// Scrapes the directory of long-term-care homes, saving every posted
/// inspection report as a PDF under one directory per home and writing a
/// JSON ledger of every report.
#[derive(Parser, Debug)]
#[command(name = "ltc-reports")]
#[command(version)]
#[command(about = "Harvest posted LTC inspection reports", long_about = None)]
struct Cli {
    /// Use given output directory (default reports)
    #[arg(short, long, value_name = "DIR")]
    repdir: Option<PathBuf>,

    /// Start with this home (useful if a run fails part way - redo the current home)
    #[arg(short, long, value_name = "HOME NAME")]
    startat: Option<String>,

    /// Show verbose progress (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Relay in-page console output to the log
    #[arg(short = 'A', long)]
    agentconsole: bool,

    /// Run the browser with a visible window
    #[arg(short = 'H', long)]
    nonheadless: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print()?;
                std::process::exit(0);
            }
            _ => {
                println!("use: {}", USAGE_LINE);
                std::process::exit(0);
            }
        },
    };

    setup_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match run_crawl(config).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Without `-v` only errors are shown; the retrieved count is printed to
/// stdout separately.
fn setup_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("error"),
        1 => EnvFilter::new("ltc_reports=debug,info"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers the optional config file and the command-line flags over the defaults
fn build_config(cli: &Cli) -> Result<Config, ltc_reports::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(repdir) = &cli.repdir {
        config.output.report_dir = repdir.clone();
    }
    if let Some(startat) = &cli.startat {
        config.crawl.start_at = Some(startat.clone());
    }
    if cli.agentconsole {
        config.browser.relay_console = true;
    }
    if cli.nonheadless {
        config.browser.headless = false;
    }

    ltc_reports::config::validate(&config)?;
    Ok(config)
}
