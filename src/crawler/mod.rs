use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use tokio::time::sleep;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::extractors::{parse_recipe_page, ListingLinkExtractor};
use crate::fetchers::{Fetcher, RequestFetcher};

mod output;
mod state;

pub use output::{read_records, JsonLinesWriter};
pub use state::{CrawlFailure, CrawlState, FailureTarget};

/// Failures listed in the summary before the rest are only counted.
const SUMMARY_ERROR_LIMIT: usize = 5;
const TITLE_PREVIEW_CHARS: usize = 50;

/// What a finished (or interrupted) crawl did.
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub output: PathBuf,
    pub pages_requested: u32,
    pub pages_failed: u32,
    /// Recipe links accepted from listing pages, before cross-page dedup
    pub links_found: usize,
    /// Links not seen earlier in the run, handed to workers
    pub links_dispatched: usize,
    pub records_written: usize,
    /// Written records with a missing title, ingredients or instructions
    pub records_degraded: usize,
    pub failures: Vec<CrawlFailure>,
    pub interrupted: bool,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Saved {} recipes to {} ({} incomplete)",
            self.records_written,
            self.output.display(),
            self.records_degraded
        )?;
        write!(
            f,
            "Listing pages: {} crawled, {} failed; recipe links: {} found, {} new",
            self.pages_requested.saturating_sub(self.pages_failed),
            self.pages_failed,
            self.links_found,
            self.links_dispatched
        )?;
        if self.interrupted {
            write!(f, "\nInterrupted: stopped dispatching, in-flight recipes were finished")?;
        }
        if !self.failures.is_empty() {
            write!(f, "\n{} errors:", self.failures.len())?;
            for failure in self.failures.iter().take(SUMMARY_ERROR_LIMIT) {
                write!(f, "\n  {failure}")?;
            }
            if self.failures.len() > SUMMARY_ERROR_LIMIT {
                write!(
                    f,
                    "\n  ... and {} more",
                    self.failures.len() - SUMMARY_ERROR_LIMIT
                )?;
            }
        }
        Ok(())
    }
}

/// Crawls listing pages one after another and scrapes the recipes each one
/// links to on a bounded pool of workers.
///
/// A recipe URL is scraped at most once per crawl, however many listing
/// pages link to it. Listing or recipe failures are logged and skipped.
pub struct Crawler {
    config: ScraperConfig,
    fetcher: Arc<dyn Fetcher>,
    links: ListingLinkExtractor,
    shutdown: Arc<AtomicBool>,
}

impl Crawler {
    pub fn new(config: ScraperConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, ScrapeError> {
        config.validate()?;
        let links = ListingLinkExtractor::new(config.base()?);

        Ok(Self {
            config,
            fetcher,
            links,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Crawler backed by a [`RequestFetcher`] built from `config.http`.
    pub fn from_config(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let fetcher = RequestFetcher::from_config(&config.http)?;
        Self::new(config, Arc::new(fetcher))
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Flag that stops the crawl from starting new pages or recipes once set.
    /// Recipes already being scraped still finish and are written.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Crawl the configured page range.
    pub async fn run(&self) -> Result<CrawlSummary, ScrapeError> {
        self.crawl(
            self.config.start_page,
            self.config.page_count,
            self.config.concurrency,
        )
        .await
    }

    /// Crawl `page_count` listing pages starting at `start_page`, with at most
    /// `concurrency` recipes in flight.
    ///
    /// Every call starts from an empty registry and reports only its own
    /// work. Only failing to open the output file is an error; everything
    /// after that ends up in the summary.
    pub async fn crawl(
        &self,
        start_page: u32,
        page_count: u32,
        concurrency: usize,
    ) -> Result<CrawlSummary, ScrapeError> {
        if concurrency == 0 {
            return Err(ScrapeError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let sink = Arc::new(JsonLinesWriter::open(&self.config.output, self.config.append).await?);
        let state = Arc::new(CrawlState::new());
        let end_page = start_page.saturating_add(page_count);
        info!(
            "Crawling listing pages {}-{} ({} pages, {} workers)",
            start_page,
            end_page.saturating_sub(1),
            page_count,
            concurrency
        );

        let mut summary = CrawlSummary {
            output: sink.path().to_path_buf(),
            ..CrawlSummary::default()
        };

        for page in start_page..end_page {
            if page > start_page {
                sleep(self.config.page_delay()).await;
            }
            if self.is_shutting_down() {
                break;
            }

            summary.pages_requested += 1;
            match self
                .crawl_page(page, end_page - 1, concurrency, &state, &sink)
                .await
            {
                Some((found, dispatched)) => {
                    summary.links_found += found;
                    summary.links_dispatched += dispatched;
                }
                None => summary.pages_failed += 1,
            }
        }

        summary.interrupted = self.is_shutting_down();
        summary.records_written = state.completed();
        summary.records_degraded = state.degraded();
        summary.failures = state.failures().await;

        info!(
            "Crawl finished: {} recipes written, {} errors",
            summary.records_written,
            summary.failures.len()
        );
        Ok(summary)
    }

    /// Fetch one listing page and scrape its new recipes. Returns
    /// `(links found, links dispatched)`, or `None` if the page failed.
    async fn crawl_page(
        &self,
        page: u32,
        last_page: u32,
        concurrency: usize,
        state: &Arc<CrawlState>,
        sink: &Arc<JsonLinesWriter>,
    ) -> Option<(usize, usize)> {
        let listing_url = self.config.listing_url(page);
        info!("[page {}/{}] {}", page, last_page, listing_url);

        let html = match self.fetcher.fetch(&listing_url).await {
            Ok(html) => html,
            Err(e) => {
                error!("Could not load listing page {}: {}", page, e);
                state
                    .record_failure(FailureTarget::ListingPage(page), e.to_string())
                    .await;
                return None;
            }
        };

        let links = self.links.extract(&html, self.config.max_links_per_page);
        let found = links.len();
        let fresh = state.claim_new(links).await;
        let dispatched = fresh.len();
        info!("  {} recipe links, {} new", found, dispatched);

        self.dispatch(fresh, concurrency, state, sink).await;
        debug!("  page {} done", page);
        Some((found, dispatched))
    }

    /// Scrape `urls` with at most `concurrency` tasks at once and wait for all
    /// of them. Each task runs on its own tokio task so a panic while parsing
    /// only loses that recipe.
    async fn dispatch(
        &self,
        urls: Vec<String>,
        concurrency: usize,
        state: &Arc<CrawlState>,
        sink: &Arc<JsonLinesWriter>,
    ) {
        let shutdown = Arc::clone(&self.shutdown);

        stream::iter(urls)
            .take_while(move |_| future::ready(!shutdown.load(Ordering::SeqCst)))
            .map(|url| {
                let job = RecipeJob {
                    fetcher: Arc::clone(&self.fetcher),
                    sink: Arc::clone(sink),
                    state: Arc::clone(state),
                    delay: self.config.recipe_delay(),
                };
                let handle = tokio::spawn(job.run(url.clone()));
                async move { (url, handle.await) }
            })
            .buffer_unordered(concurrency)
            .for_each(|(url, joined)| async move {
                if let Err(join_error) = joined {
                    let message = if join_error.is_panic() {
                        panic_message(join_error.into_panic())
                    } else {
                        join_error.to_string()
                    };
                    let failure = ScrapeError::WorkerPanicked {
                        url: url.clone(),
                        message,
                    };
                    error!("{}", failure);
                    state
                        .record_failure(FailureTarget::Recipe(url), failure.to_string())
                        .await;
                }
            })
            .await;
    }
}

/// Everything one recipe worker needs, owned so it can move onto a task.
struct RecipeJob {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<JsonLinesWriter>,
    state: Arc<CrawlState>,
    delay: Duration,
}

impl RecipeJob {
    async fn run(self, url: String) {
        sleep(self.delay).await;

        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                self.state
                    .record_failure(FailureTarget::Recipe(url), e.to_string())
                    .await;
                return;
            }
        };

        let outcome = parse_recipe_page(&html, &url);
        if let Err(e) = self.sink.write(&outcome.record).await {
            error!("Could not write {}: {}", url, e);
            self.state
                .record_failure(FailureTarget::Recipe(url), e.to_string())
                .await;
            return;
        }

        let count = self.state.record_completed(!outcome.is_complete());
        let title = preview(&outcome.record.title);
        if outcome.is_complete() {
            info!("  [{:>3}] {}", count, title);
        } else {
            warn!("  [{:>3}] {} [{}]", count, title, outcome.notes());
        }
    }
}

fn preview(title: &str) -> String {
    if title.chars().count() > TITLE_PREVIEW_CHARS {
        let cut: String = title.chars().take(TITLE_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("Kısa başlık"), "Kısa başlık");
        let long = "ş".repeat(60);
        assert_eq!(preview(&long), format!("{}...", "ş".repeat(50)));
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("bang".to_string())), "bang");
        assert_eq!(panic_message(Box::new(42)), "unknown panic");
    }

    #[test]
    fn test_summary_lists_first_errors() {
        let failures = (1..=7)
            .map(|i| CrawlFailure {
                target: FailureTarget::Recipe(format!("https://yemek.com/tarif/r-{i}/")),
                message: "HTTP 404".to_string(),
            })
            .collect();
        let summary = CrawlSummary {
            output: PathBuf::from("recipes.jsonl"),
            pages_requested: 2,
            pages_failed: 1,
            links_found: 14,
            links_dispatched: 12,
            records_written: 5,
            records_degraded: 1,
            failures,
            interrupted: false,
        };

        let text = summary.to_string();
        assert!(text.starts_with("Saved 5 recipes to recipes.jsonl (1 incomplete)"));
        assert!(text.contains("Listing pages: 1 crawled, 1 failed"));
        assert!(text.contains("7 errors:"));
        assert!(text.contains("https://yemek.com/tarif/r-5/: HTTP 404"));
        assert!(!text.contains("r-6"));
        assert!(text.contains("... and 2 more"));
    }

    #[test]
    fn test_summary_with_more_failed_than_requested_pages() {
        let summary = CrawlSummary {
            pages_requested: 1,
            pages_failed: 3,
            ..CrawlSummary::default()
        };
        assert!(summary
            .to_string()
            .contains("Listing pages: 0 crawled, 3 failed"));
    }
}
