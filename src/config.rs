use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ScrapeError;
use crate::extractors::listing::{PAGINATION_SEGMENT, RECIPE_PATH_PREFIX};
use crate::fetchers::{RetryPolicy, DEFAULT_USER_AGENT};

/// Main scraper configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ScraperConfig {
    /// Site root; listing pages live under `{base_url}/tarif/sayfa/{page}/`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// First listing page to crawl
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    /// Number of consecutive listing pages to crawl
    #[serde(default = "default_page_count")]
    pub page_count: u32,
    /// Recipe pages fetched in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Destination of the JSON lines stream
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Recipe links accepted from one listing page
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,
    /// Append to an existing output file instead of truncating it
    #[serde(default)]
    pub append: bool,
    /// Delay before each recipe fetch, in milliseconds
    #[serde(default = "default_recipe_delay_ms")]
    pub recipe_delay_ms: u64,
    /// Delay between listing pages, in milliseconds
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP client and retry settings
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay in milliseconds (doubles per retry)
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound for one backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            start_page: default_start_page(),
            page_count: default_page_count(),
            concurrency: default_concurrency(),
            output: default_output(),
            max_links_per_page: default_max_links_per_page(),
            append: false,
            recipe_delay_ms: default_recipe_delay_ms(),
            page_delay_ms: default_page_delay_ms(),
            http: HttpConfig::default(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://yemek.com".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_page_count() -> u32 {
    1
}

fn default_concurrency() -> usize {
    10
}

fn default_output() -> PathBuf {
    PathBuf::from("recipes.jsonl")
}

fn default_max_links_per_page() -> usize {
    14
}

fn default_recipe_delay_ms() -> u64 {
    200
}

fn default_page_delay_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    600
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ScraperConfig {
    /// Load configuration from `scraper.toml` and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with YEMEK__ prefix
    /// 2. scraper.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: YEMEK__HTTP__MAX_RETRIES
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }

    /// Site root as a URL.
    pub fn base(&self) -> Result<Url, ScrapeError> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// URL of listing page `page`.
    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}{}{}{}/",
            self.base_url.trim_end_matches('/'),
            RECIPE_PATH_PREFIX.trim_end_matches('/'),
            PAGINATION_SEGMENT,
            page
        )
    }

    pub fn recipe_delay(&self) -> Duration {
        Duration::from_millis(self.recipe_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Reject values the crawler cannot work with.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.concurrency == 0 {
            return Err(ScrapeError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_links_per_page == 0 {
            return Err(ScrapeError::InvalidConfig(
                "max_links_per_page must be at least 1".to_string(),
            ));
        }
        let base = self.base()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidConfig(format!(
                "base_url must be http or https, got {}",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Load configuration from an optional file and environment variables
///
/// `path` replaces the default `scraper` file name; a named file must exist.
/// Environment variables with the YEMEK prefix override file values, using a
/// double underscore for nesting: YEMEK__HTTP__TIMEOUT_SECS
pub fn load_config(path: Option<&str>) -> Result<ScraperConfig, ConfigError> {
    let file = match path {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name("scraper").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("YEMEK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
