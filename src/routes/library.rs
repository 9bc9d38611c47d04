use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{BlockedSeries, InvalidRating, LibraryItem, ShowRef, UserLibrary, WatchlistChange, WatchlistItem},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    #[serde(flatten)]
    pub show: ShowRef,
    /// 1-10, or 0 to clear the rating. Wider than the stored type so any
    /// out-of-range number is reported as an invalid rating.
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct WatchlistToggleResponse {
    pub change: WatchlistChange,
    pub watchlist: Vec<WatchlistItem>,
}

pub async fn get_library(State(state): State<Arc<AppState>>) -> Json<UserLibrary> {
    let library = state.library.read().await;
    Json(library.clone())
}

/// Clears ratings, watchlist and blocked shows
pub async fn reset(State(state): State<Arc<AppState>>) -> StatusCode {
    state.library.write().await.reset();
    tracing::info!("Library reset");
    StatusCode::NO_CONTENT
}

/// Rates a show and returns the updated rated list
pub async fn rate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<Vec<LibraryItem>>> {
    let tmdb_id = request.show.tmdb_id;
    let rating = u8::try_from(request.rating).map_err(|_| InvalidRating(request.rating))?;

    let mut library = state.library.write().await;
    library.rate(request.show, rating)?;

    tracing::info!(tmdb_id, rating = request.rating, "Show rated");
    Ok(Json(library.rated.clone()))
}

pub async fn liked(State(state): State<Arc<AppState>>) -> Json<Vec<LibraryItem>> {
    let library = state.library.read().await;
    Json(library.liked().into_iter().cloned().collect())
}

pub async fn toggle_watchlist(
    State(state): State<Arc<AppState>>,
    Json(show): Json<ShowRef>,
) -> Json<WatchlistToggleResponse> {
    let mut library = state.library.write().await;
    let change = library.toggle_watchlist(show);

    Json(WatchlistToggleResponse {
        change,
        watchlist: library.watchlist.clone(),
    })
}

/// Blocks a show; 201 when newly blocked, 200 when it already was
pub async fn block(
    State(state): State<Arc<AppState>>,
    Json(series): Json<BlockedSeries>,
) -> (StatusCode, Json<Vec<BlockedSeries>>) {
    let tmdb_id = series.tmdb_id;
    let mut library = state.library.write().await;
    let added = library.block(series);

    tracing::info!(tmdb_id, added, "Show blocked");

    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(library.blocked.clone()))
}

pub async fn unblock(
    State(state): State<Arc<AppState>>,
    Path(tmdb_id): Path<u64>,
) -> AppResult<StatusCode> {
    if state.library.write().await.unblock(tmdb_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Show {} is not blocked", tmdb_id)))
    }
}
