//! Configuration for research-shelf.

use std::path::PathBuf;
use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the OpenAlex API.
    pub const OPENALEX_API: &str = "https://api.openalex.org";

    /// Filter applied to every work search.
    pub const WORKS_FILTER: &str = "has_abstract:true,type:article";

    /// Sort order for work searches.
    pub const WORKS_SORT: &str = "relevance_score:desc";

    /// Largest `per_page` OpenAlex accepts.
    pub const MAX_PER_PAGE: u32 = 200;

    /// User agent announced to OpenAlex.
    pub const USER_AGENT: &str = concat!("research-shelf/", env!("CARGO_PKG_VERSION"));

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Retries for transient failures (timeouts, 429, 5xx).
    pub const MAX_RETRIES: u32 = 3;

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Local storage defaults.
pub mod storage {
    /// Default SQLite database file.
    pub const DATABASE_PATH: &str = "data/research-shelf.db";

    /// Default PDF directory.
    pub const PDF_DIR: &str = "data/pdfs";

    /// Largest accepted PDF upload (50 MiB).
    pub const MAX_PDF_BYTES: usize = 50 * 1024 * 1024;
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Contact address for the OpenAlex polite pool (optional).
    pub mailto: Option<String>,

    /// Base URL for the OpenAlex API (for testing with mock servers).
    pub openalex_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Retries for transient failures.
    pub max_retries: u32,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,

    /// SQLite database file.
    pub database_path: PathBuf,

    /// Directory holding uploaded PDFs.
    pub pdf_dir: PathBuf,
}

impl Config {
    /// Create a new configuration with an optional polite-pool contact address.
    #[must_use]
    pub fn new(mailto: Option<String>) -> Self {
        Self {
            mailto,
            openalex_api_url: api::OPENALEX_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_retries: api::MAX_RETRIES,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            database_path: PathBuf::from(storage::DATABASE_PATH),
            pdf_dir: PathBuf::from(storage::PDF_DIR),
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            mailto: None,
            openalex_api_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_retries: api::MAX_RETRIES,
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
            database_path: PathBuf::from(":memory:"),
            pdf_dir: std::env::temp_dir().join("research-shelf-test-pdfs"),
        }
    }

    /// Create configuration from environment variables (and a `.env` file if present).
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::new(std::env::var("OPENALEX_MAILTO").ok());
        if let Ok(url) = std::env::var("OPENALEX_API_URL") {
            anyhow::ensure!(!url.trim().is_empty(), "OPENALEX_API_URL is set but empty");
            config.openalex_api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(path) = std::env::var("RESEARCH_SHELF_DB") {
            config.database_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("RESEARCH_SHELF_PDF_DIR") {
            config.pdf_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Check if a polite-pool contact address is configured.
    #[must_use]
    pub const fn has_mailto(&self) -> bool {
        self.mailto.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.mailto.is_none());
        assert!(!config.has_mailto());
        assert_eq!(config.openalex_api_url, api::OPENALEX_API);
    }

    #[test]
    fn test_config_with_mailto() {
        let config = Config::new(Some("me@example.org".to_string()));
        assert!(config.has_mailto());
    }

    #[test]
    fn test_for_testing_strips_trailing_slash() {
        let config = Config::for_testing("http://127.0.0.1:9999/");
        assert_eq!(config.openalex_api_url, "http://127.0.0.1:9999");
        assert_eq!(config.cache_max_size, 0);
    }
}
