use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use super::{error::ApiError, AppState};
use crate::images::{get_city_by_key, CityImagesResponse, PhotoSearch};
use crate::quotes::Quote;

/// `GET /api/city-images/{city}`
pub(crate) async fn city_images_handler<S: PhotoSearch + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(city): Path<String>,
) -> Result<Json<CityImagesResponse>, ApiError> {
    let Some(city) = get_city_by_key(&city) else {
        return Err(ApiError::UnknownCity(city));
    };

    Ok(Json(state.images.get_city_images(city.key).await))
}

/// `GET /api/quote`
pub(crate) async fn quote_handler<S: PhotoSearch + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Quote>, ApiError> {
    let quote = state.quotes.fetch_random().await?;
    Ok(Json(quote))
}

/// `GET /healthz`
pub(crate) async fn health_handler() -> &'static str {
    "ok"
}
