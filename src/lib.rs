//! Recipe crawler for yemek.com.
//!
//! Walks the paginated recipe listing, pulls the recipe links out of each
//! listing page and scrapes every recipe into a [`RecipeRecord`]: title,
//! ingredients (with `## ` subsection markers) and instructions. Records are
//! appended to a JSON lines file as soon as they are parsed.
//!
//! ```no_run
//! use yemek_scraper::{Crawler, ScraperConfig};
//!
//! # async fn run() -> Result<(), yemek_scraper::ScrapeError> {
//! let config = ScraperConfig {
//!     start_page: 1,
//!     page_count: 3,
//!     ..ScraperConfig::default()
//! };
//! let summary = Crawler::from_config(config)?.run().await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod vocabulary;

pub use config::{load_config, HttpConfig, ScraperConfig};
pub use crawler::{CrawlFailure, CrawlState, CrawlSummary, Crawler, FailureTarget};
pub use error::ScrapeError;
pub use extractors::{extract_recipe_links, parse_recipe_page, ListingLinkExtractor, RecipeParser};
pub use fetchers::{FetchError, Fetcher, RequestFetcher, RetryPolicy};
pub use model::{Degradation, ParseOutcome, RecipeRecord, TITLE_NOT_FOUND};

use log::debug;

/// Fetch a single recipe page with `fetcher` and parse it.
pub async fn scrape_recipe(fetcher: &dyn Fetcher, url: &str) -> Result<ParseOutcome, ScrapeError> {
    let html = fetcher.fetch(url).await?;
    let outcome = parse_recipe_page(&html, url);
    debug!("{:#?}", outcome);
    Ok(outcome)
}

/// Fetch and parse a single recipe page with the default HTTP client.
pub async fn fetch_recipe(url: &str) -> Result<ParseOutcome, ScrapeError> {
    let fetcher = RequestFetcher::new(None)?;
    scrape_recipe(&fetcher, url).await
}
