//! Manual Crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use manual_crawler::{
    error::Result, models::Config, pipeline, services::Fetcher, storage::LocalStorage,
};

/// manual-crawler - Documentation manual page crawler
#[derive(Parser, Debug)]
#[command(
    name = "manual-crawler",
    version,
    about = "Discovers and archives documentation pages under a site's /manual/ path"
)]
struct Cli {
    /// Output directory for fetched pages and index files
    #[arg(short, long, default_value = "manual_pages")]
    out: PathBuf,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the base origin URL
    #[arg(long)]
    base: Option<String>,

    /// Override the delay between page requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Override the maximum number of URLs to crawl (0 = unlimited)
    #[arg(long)]
    limit: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover manual URLs and write urls.txt without fetching pages
    Discover,

    /// Run the full pipeline: discover, fetch, extract, persist
    Crawl,

    /// Validate configuration values
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load configuration and apply CLI overrides.
fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };

    if let Some(base) = &cli.base {
        config.discovery.base_url = base.trim_end_matches('/').to_string();
    }
    if let Some(delay) = cli.delay_ms {
        config.crawler.request_delay_ms = delay;
    }
    if let Some(limit) = cli.limit {
        config.discovery.limit = limit;
    }
    config
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli);

    match cli.command {
        Command::Discover => {
            config.validate()?;
            let fetcher = Fetcher::new(&config.crawler)?;
            let urls = pipeline::discover_urls(&fetcher, &config.discovery).await?;

            let storage = LocalStorage::new(&cli.out);
            storage.write_url_list(&urls).await?;

            for url in &urls {
                println!("{url}");
            }
            log::info!(
                "Discovered {} manual URLs, list written to {}",
                urls.len(),
                cli.out.join("urls.txt").display()
            );
        }

        Command::Crawl => {
            config.validate()?;
            let storage = LocalStorage::new(&cli.out);
            let stats = pipeline::run_crawl(&config, &storage).await?;

            log::info!("Output directory: {}", cli.out.display());
            log::info!(
                "Crawl complete: {} fetched, {} failed (of {} discovered)",
                stats.fetched,
                stats.failed,
                stats.discovered
            );
        }

        Command::Validate => {
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Configuration OK");
        }
    }

    Ok(())
}
