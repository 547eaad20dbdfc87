//! ZenQuotes API client
//!
//! Fetches a single random quote for the footer of the site.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Endpoint returning one random quote
const ZENQUOTES_RANDOM_URL: &str = "https://zenquotes.io/api/random";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching a quote
#[derive(Debug, Error)]
pub enum QuoteError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The upstream answered with no quotes
    #[error("Quote service returned no quotes")]
    Empty,
}

/// A quote as served to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub quote: String,
    pub author: String,
}

/// One element of the upstream response
#[derive(Debug, Deserialize)]
struct ZenQuote {
    q: String,
    a: String,
}

/// Client for the random quote endpoint
#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: Client,
    url: String,
}

impl Default for QuoteClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteClient {
    /// Create a new QuoteClient against the public endpoint
    pub fn new() -> Self {
        Self::with_url(ZENQUOTES_RANDOM_URL)
    }

    /// Create a QuoteClient against a custom endpoint
    pub fn with_url(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });

        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch one random quote
    pub async fn fetch_random(&self) -> Result<Quote, QuoteError> {
        let text = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_quotes(&text)
    }
}

/// Parse the upstream list and take its first quote
fn parse_quotes(body: &str) -> Result<Quote, QuoteError> {
    let quotes: Vec<ZenQuote> = serde_json::from_str(body)?;
    let first = quotes.into_iter().next().ok_or(QuoteError::Empty)?;

    Ok(Quote {
        quote: first.q,
        author: first.a,
    })
}
