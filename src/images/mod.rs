//! City image collage data
//!
//! This module contains the image types plus the pieces that turn search
//! queries into a cached, shuffled list of photo URLs per city: the static
//! city catalog, the Unsplash client, the aggregator and the freshness gate.

pub mod aggregator;
pub mod catalog;
pub mod gate;
pub mod unsplash;

pub use aggregator::{aggregate_city, cache_key, dedup_capped, PhotoSearch};
pub use catalog::{all_cities, get_city_by_key, queries_for, City};
pub use gate::{CityState, FreshnessGate};
pub use unsplash::{OrderBy, UnsplashClient, UnsplashError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::CacheStore;

/// Maximum number of unique URLs kept per city
pub const MAX_IMAGES: usize = 50;

/// Number of results requested from each query
pub const PER_QUERY_COUNT: usize = 8;

/// Maximum number of searches in flight during one aggregation
pub const MAX_CONCURRENT_FETCHES: usize = 6;

/// How long a cached city entry stays fresh
pub fn freshness_window() -> Duration {
    Duration::hours(1)
}

/// A single search result
///
/// The identifier is only used to deduplicate within one aggregation and is
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHit {
    /// Source-assigned photo identifier
    pub id: String,
    /// URL of the image at display resolution
    pub url: String,
}

impl ImageHit {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Cached image list for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityImages {
    /// Deduplicated, shuffled photo URLs
    pub images: Vec<String>,
    /// When the aggregation that produced `images` finished
    pub fetched_at: DateTime<Utc>,
}

impl CityImages {
    /// Whether this entry can be served as-is at `now`
    ///
    /// Empty entries are never fresh so the next request tries again. An entry
    /// stamped after `now` is stale.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        let age = now - self.fetched_at;
        !self.images.is_empty() && age >= Duration::zero() && age < freshness_window()
    }
}

/// Where the images in a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Fetched from the image API
    Dynamic,
    /// The browser should use its bundled images
    Static,
}

/// Body of the city images endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityImagesResponse {
    pub images: Vec<String>,
    pub source: ImageSource,
}

impl CityImagesResponse {
    /// Response telling the browser to fall back to its bundled images
    pub fn fallback() -> Self {
        Self {
            images: Vec::new(),
            source: ImageSource::Static,
        }
    }
}

/// Entry point used by the HTTP layer
///
/// Applies the dynamic/static feature flag before touching the gate.
pub struct ImageService<S> {
    gate: FreshnessGate<S>,
    dynamic_enabled: bool,
}

impl ImageService<UnsplashClient> {
    /// Creates a service backed by the Unsplash API
    ///
    /// Dynamic sourcing is only active when it is enabled and a credential is set.
    pub fn unsplash(client: UnsplashClient, store: Arc<CacheStore>, dynamic_enabled: bool) -> Self {
        let dynamic_enabled = dynamic_enabled && client.has_credentials();
        Self::new(FreshnessGate::new(client, store), dynamic_enabled)
    }
}

impl<S: PhotoSearch> ImageService<S> {
    pub fn new(gate: FreshnessGate<S>, dynamic_enabled: bool) -> Self {
        Self {
            gate,
            dynamic_enabled,
        }
    }

    /// Whether requests can reach the image API at all
    pub fn is_dynamic(&self) -> bool {
        self.dynamic_enabled
    }

    /// Returns the images to show for `city`
    pub async fn get_city_images(&self, city: &str) -> CityImagesResponse {
        if !self.dynamic_enabled {
            return CityImagesResponse::fallback();
        }

        let images = self.gate.get_images(city).await;
        if images.is_empty() {
            CityImagesResponse::fallback()
        } else {
            CityImagesResponse {
                images,
                source: ImageSource::Dynamic,
            }
        }
    }
}
