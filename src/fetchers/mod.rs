use async_trait::async_trait;
use thiserror::Error;

mod request;

pub use request::{RequestFetcher, RetryPolicy, DEFAULT_USER_AGENT};

/// A page could not be fetched, after any retries.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection failure, timeout or body read error
    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    Request {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status} after {attempts} attempt(s)")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        attempts: u32,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. } | FetchError::Status { url, .. } => url,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            FetchError::Request { attempts, .. } | FetchError::Status { attempts, .. } => *attempts,
        }
    }
}

/// Source of page HTML. The crawler only talks to this trait.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
