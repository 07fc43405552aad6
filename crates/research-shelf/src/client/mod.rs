//! OpenAlex API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Response caching with 5-minute TTL

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{SearchResult, WorksResponse};

/// OpenAlex API client.
#[derive(Clone)]
pub struct OpenAlexClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache.
    cache: Cache<String, serde_json::Value>,

    /// Polite-pool contact address.
    mailto: Option<String>,

    /// API base URL.
    api_url: String,

    /// Per-request timeout, reported back in `ClientError::Timeout`.
    request_timeout: Duration,
}

impl OpenAlexClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let user_agent = match &config.mailto {
            Some(mailto) => format!("{} (mailto:{mailto})", api::USER_AGENT),
            None => api::USER_AGENT.to_string(),
        };

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            client,
            cache,
            mailto: config.mailto.clone(),
            api_url: config.openalex_api_url.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// Check if a polite-pool contact address is configured.
    #[must_use]
    pub fn has_mailto(&self) -> bool {
        self.mailto.is_some()
    }

    /// Search OpenAlex works, restricted to articles that have an abstract.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for an empty query or a limit outside 1..=200,
    /// otherwise any API failure.
    pub async fn search_works(&self, query: &str, limit: u32) -> ClientResult<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(ClientError::bad_request("query cannot be empty"));
        }
        if !(1..=api::MAX_PER_PAGE).contains(&limit) {
            return Err(ClientError::bad_request(format!(
                "limit must be between 1 and {}",
                api::MAX_PER_PAGE
            )));
        }

        let url = format!("{}/works", self.api_url);
        let mut params = vec![
            ("search".to_string(), query.to_string()),
            ("filter".to_string(), api::WORKS_FILTER.to_string()),
            ("per_page".to_string(), limit.to_string()),
            ("sort".to_string(), api::WORKS_SORT.to_string()),
        ];
        if let Some(mailto) = &self.mailto {
            params.push(("mailto".to_string(), mailto.clone()));
        }

        let response: WorksResponse = self.get(&url, &params).await?;
        tracing::debug!(query, hits = response.results.len(), "OpenAlex search finished");

        Ok(response.results.into_iter().map(SearchResult::from).collect())
    }

    /// Make a GET request.
    async fn get<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        // Check cache
        let cache_key = self.cache_key("GET", url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::trace!(url, "Cache hit");
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        let response = self.client.get(url).query(params).send().await.map_err(|e| match e {
            reqwest_middleware::Error::Reqwest(e) => self.transport_error(e),
            other => ClientError::Middleware(other),
        })?;

        let response = self.handle_response(response).await?;
        let value: serde_json::Value =
            response.json().await.map_err(|e| self.transport_error(e))?;

        // Cache response
        self.cache.insert(cache_key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            tracing::warn!(timeout = ?self.request_timeout, "OpenAlex request timed out");
            ClientError::Timeout(self.request_timeout)
        } else {
            ClientError::Http(err)
        }
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        tracing::warn!(status = status.as_u16(), url = %response.url(), "OpenAlex request failed");

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for OpenAlexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAlexClient")
            .field("api_url", &self.api_url)
            .field("has_mailto", &self.has_mailto())
            .finish()
    }
}
