use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use yemek_scraper::{load_config, scrape_recipe, Crawler, RequestFetcher, ScraperConfig};

#[derive(Parser)]
#[command(name = "yemek-scraper", version, about = "Crawl yemek.com recipes into JSON lines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl listing pages and write every recipe to the output file
    Crawl(CrawlArgs),
    /// Fetch and parse a single recipe page and print it as JSON
    Parse {
        /// Recipe page URL
        url: String,
        /// Configuration file (defaults to ./scraper.toml if present)
        #[arg(long)]
        config: Option<String>,
    },
}

#[derive(Args)]
struct CrawlArgs {
    /// Configuration file (defaults to ./scraper.toml if present)
    #[arg(long)]
    config: Option<String>,
    /// First listing page
    #[arg(long)]
    start_page: Option<u32>,
    /// Number of listing pages
    #[arg(long)]
    pages: Option<u32>,
    /// Recipe pages fetched in parallel
    #[arg(long)]
    concurrency: Option<usize>,
    /// Output file (JSON lines)
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Recipe links accepted per listing page
    #[arg(long)]
    max_links: Option<usize>,
    /// Append to the output file instead of truncating it
    #[arg(long)]
    append: bool,
}

impl CrawlArgs {
    fn apply(&self, config: &mut ScraperConfig) {
        if let Some(start_page) = self.start_page {
            config.start_page = start_page;
        }
        if let Some(pages) = self.pages {
            config.page_count = pages;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(max_links) = self.max_links {
            config.max_links_per_page = max_links;
        }
        if self.append {
            config.append = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Crawl(args) => {
            let mut config = load_config(args.config.as_deref())?;
            args.apply(&mut config);

            let crawler = Crawler::from_config(config)?;
            let shutdown = crawler.shutdown_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted; finishing recipes already in flight");
                    shutdown.store(true, Ordering::SeqCst);
                }
            });

            let summary = crawler.run().await?;
            info!("Done");
            println!("{summary}");
        }
        Command::Parse { url, config } => {
            let config = load_config(config.as_deref())?;
            let fetcher = RequestFetcher::from_config(&config.http)?;
            match scrape_recipe(&fetcher, &url).await {
                Ok(outcome) => {
                    if !outcome.is_complete() {
                        warn!("Incomplete recipe: {}", outcome.notes());
                    }
                    println!("{}", serde_json::to_string_pretty(&outcome.record)?);
                }
                Err(e) => {
                    error!("Could not scrape {}: {}", url, e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
