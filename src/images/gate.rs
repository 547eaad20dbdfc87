//! Freshness gate for city image lists
//!
//! Serves cached lists while they are fresh and refreshes stale ones, with at
//! most one refresh in flight per city. Refreshes of different cities do not
//! block each other.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use super::{aggregate_city, cache_key, CityImages, PhotoSearch};
use crate::cache::CacheStore;

/// Current state of one city's image list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityState {
    /// Cached, non-empty and inside the freshness window
    Fresh,
    /// Missing, empty or too old
    Stale,
    /// An aggregation for this city is in flight
    Refreshing,
}

/// Decides per request whether to serve the cache or aggregate again
pub struct FreshnessGate<S> {
    search: S,
    store: Arc<CacheStore>,
    /// Cities with an aggregation in flight
    refreshing: Mutex<HashSet<String>>,
}

/// Marks a city as refreshing until dropped
///
/// Dropping also covers a cancelled request, so a city is never stuck.
struct RefreshClaim<'a> {
    refreshing: &'a Mutex<HashSet<String>>,
    city: String,
}

impl Drop for RefreshClaim<'_> {
    fn drop(&mut self) {
        self.refreshing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.city);
    }
}

impl<S: PhotoSearch> FreshnessGate<S> {
    pub fn new(search: S, store: Arc<CacheStore>) -> Self {
        Self {
            search,
            store,
            refreshing: Mutex::new(HashSet::new()),
        }
    }

    /// Cached entry for `city`, if any
    pub fn cached(&self, city: &str) -> Option<CityImages> {
        self.store.get_as(&cache_key(city))
    }

    /// State of `city` right now
    pub fn state(&self, city: &str) -> CityState {
        self.state_at(city, Utc::now())
    }

    /// State of `city` as seen at `now`
    pub fn state_at(&self, city: &str, now: DateTime<Utc>) -> CityState {
        let refreshing = self.refreshing.lock().unwrap_or_else(PoisonError::into_inner);
        if refreshing.contains(city) {
            return CityState::Refreshing;
        }

        match self.cached(city) {
            Some(entry) if entry.is_fresh_at(now) => CityState::Fresh,
            _ => CityState::Stale,
        }
    }

    /// Returns the image list for `city`, refreshing it first if stale
    ///
    /// While another request is refreshing the same city this returns the
    /// current cache contents, which may be empty.
    pub async fn get_images(&self, city: &str) -> Vec<String> {
        self.get_images_at(city, Utc::now()).await
    }

    pub(crate) async fn get_images_at(&self, city: &str, now: DateTime<Utc>) -> Vec<String> {
        let claim = {
            let mut refreshing = self.refreshing.lock().unwrap_or_else(PoisonError::into_inner);
            let cached = self.cached(city);

            if refreshing.contains(city) {
                debug!(city, "Refresh in flight, serving current cache");
                return cached.map(|entry| entry.images).unwrap_or_default();
            }

            if let Some(entry) = cached {
                if entry.is_fresh_at(now) {
                    debug!(city, images = entry.images.len(), "Serving fresh cache");
                    return entry.images;
                }
            }

            refreshing.insert(city.to_string());
            RefreshClaim {
                refreshing: &self.refreshing,
                city: city.to_string(),
            }
        };

        let entry = aggregate_city(&self.search, &self.store, city).await;
        drop(claim);

        entry.images
    }
}
