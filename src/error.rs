use thiserror::Error;

use crate::fetchers::FetchError;

/// Errors that can occur while crawling or scraping recipes
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Failed to fetch a page, after retries
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Failed to build the HTTP client
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A configured or discovered URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to open or append to the output stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize a record
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration loaded but holds an unusable value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A recipe worker panicked while parsing a page
    #[error("Worker for {url} panicked: {message}")]
    WorkerPanicked { url: String, message: String },
}
