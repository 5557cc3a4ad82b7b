//! HTTP client for the Naver shopping search API.
//!
//! Wraps `reqwest` with credential headers, typed response deserialization,
//! and a read-through [`ResponseCache`]. Fetches are never retried.

use std::time::Duration;

use reqwest::{Client, Url};
use storefinder_core::{AppConfig, NaverCredentials};

use crate::cache::{CacheKey, ResponseCache};
use crate::error::SearchError;
use crate::source::{PageRequest, PageSource};
use crate::types::ShoppingResponse;

const DEFAULT_BASE_URL: &str = "https://openapi.naver.com/v1/search/shop.json";
const DEFAULT_USER_AGENT: &str = "storefinder/0.1 (store-intersection)";

const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";

/// Client for the shopping search endpoint.
///
/// Use [`NaverShoppingClient::new`] for production,
/// [`NaverShoppingClient::from_config`] to build from the environment, or
/// [`NaverShoppingClient::with_base_url`] to point at a mock server in tests.
pub struct NaverShoppingClient {
    client: Client,
    credentials: NaverCredentials,
    base_url: Url,
    cache: ResponseCache,
}

impl NaverShoppingClient {
    /// Creates a client pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        credentials: NaverCredentials,
        timeout_secs: u64,
        cache: ResponseCache,
    ) -> Result<Self, SearchError> {
        Self::with_base_url(
            credentials,
            timeout_secs,
            DEFAULT_USER_AGENT,
            DEFAULT_BASE_URL,
            cache,
        )
    }

    /// Creates a client against a custom endpoint URL (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        credentials: NaverCredentials,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
        cache: ResponseCache,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            credentials,
            base_url,
            cache,
        })
    }

    /// Builds a client from application configuration, with a fresh cache
    /// sized by the configured TTL and capacity.
    ///
    /// # Errors
    ///
    /// - [`SearchError::MissingCredentials`] if no credentials are configured.
    /// - Any error from [`Self::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        let credentials = config
            .naver_credentials
            .clone()
            .ok_or(SearchError::MissingCredentials)?;
        let cache = ResponseCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_max_entries,
        );
        Self::with_base_url(
            credentials,
            config.request_timeout_secs,
            &config.user_agent,
            &config.api_base_url,
            cache,
        )
    }

    /// Fetches one page, serving it from the cache when an identical request
    /// was answered within the cache TTL. Successful responses are cached.
    ///
    /// # Errors
    ///
    /// - [`SearchError::RemoteStatus`] on a non-2xx status, carrying the
    ///   response body as the message.
    /// - [`SearchError::Http`] on network failure.
    /// - [`SearchError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn search_page(
        &self,
        request: &PageRequest,
    ) -> Result<ShoppingResponse, SearchError> {
        let key = CacheKey::from(request);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(cache_key = %key, "page served from cache");
            return Ok(cached);
        }

        let url = self.page_url(request);
        tracing::debug!(
            keyword = %request.keyword,
            start = request.start,
            sort = %request.sort,
            "fetching shopping page"
        );

        let response = self
            .client
            .get(url)
            .header(CLIENT_ID_HEADER, &self.credentials.client_id)
            .header(CLIENT_SECRET_HEADER, &self.credentials.client_secret)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                keyword = %request.keyword,
                "shopping search returned non-success status"
            );
            return Err(SearchError::RemoteStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let page = serde_json::from_str::<ShoppingResponse>(&body).map_err(|e| {
            SearchError::Deserialize {
                context: format!("shopping page {key}"),
                source: e,
            }
        })?;

        self.cache.insert(key, page.clone()).await;
        Ok(page)
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn page_url(&self, request: &PageRequest) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("query", &request.keyword)
            .append_pair("display", &request.page_size.to_string())
            .append_pair("start", &request.start.to_string())
            .append_pair("sort", request.sort.as_code());
        url
    }
}

impl PageSource for NaverShoppingClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ShoppingResponse, SearchError> {
        self.search_page(request).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
