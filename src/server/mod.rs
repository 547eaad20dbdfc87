//! HTTP layer
//!
//! Builds the axum router exposing the JSON endpoints the site's scripts call,
//! plus static asset serving and a health probe.

mod error;
mod routes;

pub use error::ApiError;

use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::cache::CacheStore;
use crate::cli::ServerConfig;
use crate::images::{all_cities, ImageService, PhotoSearch, UnsplashClient};
use crate::quotes::QuoteClient;

/// Shared state handed to every handler
pub struct AppState<S> {
    pub images: ImageService<S>,
    pub quotes: QuoteClient,
}

impl AppState<UnsplashClient> {
    /// Wires the production clients from configuration
    pub fn from_config(config: &ServerConfig, store: Arc<CacheStore>) -> Self {
        let client = UnsplashClient::new(config.unsplash_access_key.clone());
        Self {
            images: ImageService::unsplash(client, store, config.dynamic_images),
            quotes: QuoteClient::new(),
        }
    }
}

/// Builds the application router
pub fn router<S: PhotoSearch + 'static>(state: Arc<AppState<S>>, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/city-images/{city}", get(routes::city_images_handler::<S>))
        .route("/api/quote", get(routes::quote_handler::<S>))
        .route("/healthz", get(routes::health_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Refreshes every catalog city once, one after another
pub async fn warm_cache<S: PhotoSearch>(images: &ImageService<S>) {
    if !images.is_dynamic() {
        info!("Dynamic images disabled, skipping cache warm-up");
        return;
    }

    for city in all_cities() {
        let response = images.get_city_images(city.key).await;
        info!(
            city = city.key,
            name = city.name,
            images = response.images.len(),
            "Warmed city images"
        );
    }
}

/// Binds the configured address and serves until Ctrl-C
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let store = Arc::new(CacheStore::load(&config.cache_file));
    info!(
        path = %store.path().display(),
        keys = store.len(),
        "Cache store ready"
    );

    let state = Arc::new(AppState::from_config(&config, store));
    info!(dynamic = state.images.is_dynamic(), "Image sourcing configured");

    if config.warm {
        let state = state.clone();
        tokio::spawn(async move { warm_cache(&state.images).await });
    }

    let app = router(state, &config.static_dir);
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
