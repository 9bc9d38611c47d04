use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{default_language, DiscoverQuery, Genre, TmdbShow},
    routes::AppState,
    services::catalog,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "default_language")]
    language: String,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    title: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    #[serde(default = "default_language")]
    language: String,
}

/// Show details plus fields derived for the client
#[derive(Debug, Serialize)]
pub struct ShowDetailsResponse {
    #[serde(flatten)]
    pub show: TmdbShow,
    pub trailer_url: Option<String>,
    pub imdb_id: Option<String>,
}

impl From<TmdbShow> for ShowDetailsResponse {
    fn from(show: TmdbShow) -> Self {
        let trailer_url = show.trailer_url();
        let imdb_id = show.external_ids.as_ref().and_then(|ids| ids.imdb_id.clone());
        Self {
            show,
            trailer_url,
            imdb_id,
        }
    }
}

/// Handler for TV search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<TmdbShow>>> {
    let blocked = state.library.read().await.block_list();
    let shows =
        catalog::search_shows(state.catalog.clone(), &params.q, &params.language, &blocked).await?;
    Ok(Json(shows))
}

/// Handler resolving a title to its best match
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupQuery>,
) -> AppResult<Json<TmdbShow>> {
    let blocked = state.library.read().await.block_list();
    let show = catalog::lookup_show(state.catalog.clone(), &params.title, &blocked).await?;
    Ok(Json(show))
}

/// Handler for one show's details
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> AppResult<Json<ShowDetailsResponse>> {
    let show = state.catalog.tv_details(id).await?;
    Ok(Json(show.into()))
}

pub async fn popular(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<TmdbShow>>> {
    let shows = state.catalog.popular().await?;
    let blocked = state.library.read().await.block_list();
    Ok(Json(blocked.filter(shows)))
}

pub async fn top_rated(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<TmdbShow>>> {
    let shows = state.catalog.top_rated().await?;
    let blocked = state.library.read().await.block_list();
    Ok(Json(blocked.filter(shows)))
}

pub async fn genres(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LanguageQuery>,
) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.catalog.genres(&params.language).await?;
    Ok(Json(genres))
}

/// Handler for catalog browsing
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiscoverQuery>,
) -> AppResult<Json<Vec<TmdbShow>>> {
    let blocked = state.library.read().await.block_list();
    let shows = catalog::discover_shows(state.catalog.clone(), &query, &blocked).await?;
    Ok(Json(shows))
}
