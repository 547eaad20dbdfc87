//! City image aggregation
//!
//! Fans a city's queries out to the photo search, deduplicates the results by
//! photo identifier and writes the shuffled list through to the cache.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::{
    queries_for, CityImages, ImageHit, MAX_CONCURRENT_FETCHES, MAX_IMAGES, PER_QUERY_COUNT,
};
use crate::cache::CacheStore;

/// A photo search backend
///
/// Implementations never fail; an unreachable backend yields no hits.
pub trait PhotoSearch: Send + Sync {
    fn search(&self, query: &str, count: usize) -> impl Future<Output = Vec<ImageHit>> + Send;
}

impl<T: PhotoSearch> PhotoSearch for Arc<T> {
    fn search(&self, query: &str, count: usize) -> impl Future<Output = Vec<ImageHit>> + Send {
        (**self).search(query, count)
    }
}

/// Cache key under which a city's images are stored
pub fn cache_key(city: &str) -> String {
    format!("city_images_{}", city)
}

/// Keeps the first URL seen per identifier, up to `cap` unique entries
///
/// Items past the cap are consumed and discarded.
pub fn dedup_capped<I>(hits: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = ImageHit>,
{
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for hit in hits {
        if urls.len() >= cap {
            continue;
        }
        if seen.insert(hit.id) {
            urls.push(hit.url);
        }
    }

    urls
}

/// Builds a fresh image list for `city` and stores it
///
/// Unknown cities are searched by their key. Searches run concurrently with at
/// most `MAX_CONCURRENT_FETCHES` in flight, and all of them are awaited before
/// returning. The entry is written even when no images were found.
pub async fn aggregate_city<S: PhotoSearch>(
    search: &S,
    store: &CacheStore,
    city: &str,
) -> CityImages {
    let started = Instant::now();

    let mut queries = queries_for(city);
    queries.shuffle(&mut rand::thread_rng());
    let query_count = queries.len();

    let searches: Vec<_> = queries
        .iter()
        .map(|query| search.search(query, PER_QUERY_COUNT))
        .collect();

    // Batches arrive in completion order
    let batches: Vec<Vec<ImageHit>> = stream::iter(searches)
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect()
        .await;

    let mut images = dedup_capped(batches.into_iter().flatten(), MAX_IMAGES);
    images.shuffle(&mut rand::thread_rng());

    let entry = CityImages {
        images,
        fetched_at: Utc::now(),
    };
    store.set_as(&cache_key(city), &entry);

    info!(
        city,
        queries = query_count,
        images = entry.images.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Aggregated city images"
    );

    entry
}
