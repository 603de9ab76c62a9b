//! HTTP client for the store promotions endpoint.

mod fetch_store;
mod headers;
mod retrieve;

use std::num::NonZeroU32;
use std::time::Duration;

use promodb_core::{parse_promotion, AppConfig, Promotion};
use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::query::PageQuery;
use crate::types::PromotionsPage;

pub use retrieve::Retrieval;

/// Largest page the promotions API serves.
pub const DEFAULT_PAGE_SIZE: u32 = 36;

/// Upper bound on non-empty pages per store before giving up.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Transport and paging settings for [`PromotionsClient`].
///
/// Timeouts are always explicit: there is no "whatever reqwest defaults to".
/// Failed requests are not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    pub max_pages: usize,
    /// Stores fetched at the same time. `0` means all of them.
    pub max_concurrent_stores: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: promodb_core::config::DEFAULT_USER_AGENT.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            max_concurrent_stores: 0,
        }
    }
}

impl From<&AppConfig> for ClientSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_timeout_secs: config.request_timeout_secs,
            connect_timeout_secs: config.connect_timeout_secs,
            user_agent: config.user_agent.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
            max_concurrent_stores: config.max_concurrent_stores,
        }
    }
}

/// Client for the promotions API.
///
/// Owns one `reqwest::Client` carrying the browser-like default headers the
/// API expects. The client holds no per-store state, so a single instance
/// serves any number of concurrent store fetches.
pub struct PromotionsClient {
    client: Client,
    api_url: Url,
    pub(super) page_size: NonZeroU32,
    pub(super) max_pages: usize,
    pub(super) max_concurrent_stores: usize,
}

impl PromotionsClient {
    /// Creates a client for the promotions endpoint at `api_url`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidApiUrl`] if `api_url` is not an absolute
    ///   `http`/`https` URL.
    /// - [`ScraperError::InvalidSettings`] if `page_size` or `max_pages` is zero.
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(api_url: &str, settings: &ClientSettings) -> Result<Self, ScraperError> {
        let invalid_url = |reason: String| ScraperError::InvalidApiUrl {
            url: api_url.to_owned(),
            reason,
        };
        let parsed = Url::parse(api_url).map_err(|e| invalid_url(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid_url(format!(
                "unsupported scheme \"{}\"",
                parsed.scheme()
            )));
        }

        let page_size = NonZeroU32::new(settings.page_size).ok_or_else(|| {
            ScraperError::InvalidSettings("page_size must be greater than zero".to_owned())
        })?;
        if settings.max_pages == 0 {
            return Err(ScraperError::InvalidSettings(
                "max_pages must be greater than zero".to_owned(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers::default_headers())
            .build()?;

        Ok(Self {
            client,
            api_url: parsed,
            page_size,
            max_pages: settings.max_pages,
            max_concurrent_stores: settings.max_concurrent_stores,
        })
    }

    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`PromotionsClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(&config.api_url, &ClientSettings::from(config))
    }

    /// Fetches and validates one page of promotions.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::Deserialize`] if the body is not a `{"data": [...]}` envelope.
    /// - [`ScraperError::Validation`] if any record on the page fails validation.
    pub async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<Promotion>, ScraperError> {
        let store_id = query.store.store_id;
        let url = self.page_url(query);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let page = serde_json::from_str::<PromotionsPage>(&body).map_err(|e| {
            ScraperError::Deserialize {
                context: format!(
                    "promotions page for store {store_id} at offset {}",
                    query.offset
                ),
                source: e,
            }
        })?;

        let promotions = page
            .data
            .into_iter()
            .map(|raw| {
                parse_promotion(raw).map_err(|source| ScraperError::Validation {
                    store_id,
                    offset: query.offset,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            store_id,
            offset = query.offset,
            promotions = promotions.len(),
            "fetched promotions page"
        );
        Ok(promotions)
    }

    /// Builds the request URL, appending the page's query pairs to any query
    /// string already present on the configured endpoint.
    fn page_url(&self, query: &PageQuery<'_>) -> Url {
        let mut url = self.api_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        url
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
