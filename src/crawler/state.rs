use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

/// What a failure was about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureTarget {
    ListingPage(u32),
    Recipe(String),
}

impl fmt::Display for FailureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureTarget::ListingPage(page) => write!(f, "listing page {page}"),
            FailureTarget::Recipe(url) => f.write_str(url),
        }
    }
}

/// One entry of the crawl error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFailure {
    pub target: FailureTarget,
    pub message: String,
}

impl fmt::Display for CrawlFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target, self.message)
    }
}

/// Crawl-wide state shared by every recipe worker.
#[derive(Debug, Default)]
pub struct CrawlState {
    seen_urls: Mutex<HashSet<String>>,
    completed: AtomicUsize,
    degraded: AtomicUsize,
    errors: Mutex<Vec<CrawlFailure>>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `url` as taken. Returns false if it was already claimed this run.
    pub async fn claim(&self, url: &str) -> bool {
        self.seen_urls.lock().await.insert(url.to_string())
    }

    /// Claim every unseen URL of `urls` in one critical section, keeping order.
    pub async fn claim_new(&self, urls: Vec<String>) -> Vec<String> {
        let mut seen = self.seen_urls.lock().await;
        urls.into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    pub async fn seen_count(&self) -> usize {
        self.seen_urls.lock().await.len()
    }

    /// Count a written record; returns the new total.
    pub fn record_completed(&self, degraded: bool) -> usize {
        if degraded {
            self.degraded.fetch_add(1, Ordering::Relaxed);
        }
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn degraded(&self) -> usize {
        self.degraded.load(Ordering::Relaxed)
    }

    pub async fn record_failure(&self, target: FailureTarget, message: impl Into<String>) {
        self.errors.lock().await.push(CrawlFailure {
            target,
            message: message.into(),
        });
    }

    /// Snapshot of the error log, oldest first.
    pub async fn failures(&self) -> Vec<CrawlFailure> {
        self.errors.lock().await.clone()
    }
}
