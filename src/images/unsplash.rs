//! Unsplash search API client
//!
//! Issues one photo search per query and maps the response to `ImageHit`s.
//! Every failure is logged and turned into an empty result.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::{ImageHit, PhotoSearch};

/// Base URL for the Unsplash API
const UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result pages a search may start from
const PAGE_CHOICES: [u32; 3] = [1, 2, 3];

/// Sort orders a search may use
const ORDER_CHOICES: [OrderBy; 2] = [OrderBy::Relevant, OrderBy::Latest];

/// Errors that can occur when searching for photos
#[derive(Debug, Error)]
pub enum UnsplashError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Result ordering requested from the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Relevant,
    Latest,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Relevant => "relevant",
            OrderBy::Latest => "latest",
        }
    }
}

/// Paging and ordering for one search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchVariant {
    page: u32,
    order_by: OrderBy,
}

impl SearchVariant {
    /// Picks page and order uniformly so repeated searches see different photos
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            page: PAGE_CHOICES.choose(rng).copied().unwrap_or(1),
            order_by: ORDER_CHOICES.choose(rng).copied().unwrap_or(OrderBy::Relevant),
        }
    }
}

/// Client for the Unsplash photo search endpoint
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    client: Client,
    access_key: Option<String>,
    base_url: String,
}

impl UnsplashClient {
    /// Creates a client for the public API
    ///
    /// Without an access key every search returns nothing.
    pub fn new(access_key: Option<String>) -> Self {
        Self::with_base_url(access_key, UNSPLASH_BASE_URL)
    }

    /// Creates a client against a custom base URL
    pub fn with_base_url(access_key: Option<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });

        Self {
            client,
            access_key: access_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Whether an access key is configured
    pub fn has_credentials(&self) -> bool {
        self.access_key.is_some()
    }

    /// Searches for `count` photos matching `query`
    ///
    /// Never fails: errors are logged and produce an empty list.
    pub async fn search_photos(&self, query: &str, count: usize) -> Vec<ImageHit> {
        let Some(access_key) = self.access_key.as_deref() else {
            return Vec::new();
        };

        let variant = SearchVariant::random(&mut rand::thread_rng());

        match self.request(access_key, query, count, variant).await {
            Ok(hits) => {
                debug!(
                    query,
                    page = variant.page,
                    order_by = variant.order_by.as_str(),
                    hits = hits.len(),
                    "Photo search finished"
                );
                hits
            }
            Err(e) => {
                warn!(query, error = %e, "Photo search failed");
                Vec::new()
            }
        }
    }

    async fn request(
        &self,
        access_key: &str,
        query: &str,
        count: usize,
        variant: SearchVariant,
    ) -> Result<Vec<ImageHit>, UnsplashError> {
        let url = format!("{}/search/photos", self.base_url);
        let per_page = count.to_string();
        let page = variant.page.to_string();

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Client-ID {}", access_key))
            .header("Accept-Version", "v1")
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
                ("orientation", "landscape"),
                ("content_filter", "high"),
                ("order_by", variant.order_by.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        parse_search_response(&text)
    }
}

impl PhotoSearch for UnsplashClient {
    async fn search(&self, query: &str, count: usize) -> Vec<ImageHit> {
        self.search_photos(query, count).await
    }
}

/// Parses a search response body into hits
///
/// Prefers the `regular` URL and falls back to `small`. Photos without an
/// identifier or without any usable URL are dropped.
pub(crate) fn parse_search_response(body: &str) -> Result<Vec<ImageHit>, UnsplashError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let hits = response
        .results
        .into_iter()
        .filter_map(|photo| {
            let id = photo.id.filter(|id| !id.is_empty())?;
            let urls = photo.urls?;
            let url = urls
                .regular
                .filter(|u| !u.is_empty())
                .or(urls.small.filter(|u| !u.is_empty()))?;
            Some(ImageHit { id, url })
        })
        .collect();

    Ok(hits)
}

/// Unsplash search response structure
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

/// A photo object from the search results
#[derive(Debug, Deserialize)]
struct Photo {
    id: Option<String>,
    urls: Option<PhotoUrls>,
}

/// Resolution variants of a photo
#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
    small: Option<String>,
}
