//! TMDB (The Movie Database) v3 provider
//!
//! Every call goes through the Redis read-through cache. Upstream failures
//! surface as `ExternalApi` errors; a 404 on a detail lookup is `NotFound`.

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{DiscoverQuery, Genre, GenreList, TmdbResults, TmdbShow},
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 86400; // 1 day
const LIST_CACHE_TTL: u64 = 21600; // 6 hours
const GENRE_CACHE_TTL: u64 = 604800; // 1 week
const DETAIL_APPENDS: &str = "videos,reviews,external_ids";
const LIST_LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource not found: {}", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_list(&self, path: &str) -> AppResult<Vec<TmdbShow>> {
        let page: TmdbResults<TmdbShow> = self
            .get_json(
                path,
                &[("language", LIST_LANGUAGE.to_string()), ("page", "1".to_string())],
            )
            .await?;

        tracing::info!(
            path = %path,
            results = page.results.len(),
            provider = "tmdb",
            "Catalog list fetched"
        );

        Ok(page.results)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search_tv(&self, query: &str, language: &str) -> AppResult<Vec<TmdbShow>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        cached!(
            self.cache,
            CacheKey::TvSearch(language.to_string(), query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let page: TmdbResults<TmdbShow> = self
                    .get_json(
                        "search/tv",
                        &[
                            ("query", query.to_string()),
                            ("language", language.to_string()),
                            ("page", "1".to_string()),
                        ],
                    )
                    .await?;

                tracing::info!(
                    query = %query,
                    results = page.results.len(),
                    provider = "tmdb",
                    "TV search completed"
                );

                Ok::<_, AppError>(page.results)
            }
        )
    }

    async fn tv_details(&self, id: u64) -> AppResult<TmdbShow> {
        cached!(
            self.cache,
            CacheKey::TvDetails(id),
            DETAILS_CACHE_TTL,
            async move {
                let show: TmdbShow = self
                    .get_json(
                        &format!("tv/{}", id),
                        &[("append_to_response", DETAIL_APPENDS.to_string())],
                    )
                    .await?;

                tracing::info!(tmdb_id = id, provider = "tmdb", "TV details fetched");

                Ok::<_, AppError>(show)
            }
        )
    }

    async fn top_rated(&self) -> AppResult<Vec<TmdbShow>> {
        cached!(
            self.cache,
            CacheKey::TopRated,
            LIST_CACHE_TTL,
            self.fetch_list("tv/top_rated")
        )
    }

    async fn popular(&self) -> AppResult<Vec<TmdbShow>> {
        cached!(
            self.cache,
            CacheKey::Popular,
            LIST_CACHE_TTL,
            self.fetch_list("tv/popular")
        )
    }

    async fn genres(&self, language: &str) -> AppResult<Vec<Genre>> {
        cached!(
            self.cache,
            CacheKey::Genres(language.to_string()),
            GENRE_CACHE_TTL,
            async move {
                let list: GenreList = self
                    .get_json("genre/tv/list", &[("language", language.to_string())])
                    .await?;
                Ok::<_, AppError>(list.genres)
            }
        )
    }

    async fn discover(&self, query: &DiscoverQuery) -> AppResult<Vec<TmdbShow>> {
        cached!(
            self.cache,
            CacheKey::Discover(query.clone()),
            LIST_CACHE_TTL,
            async move {
                let page: TmdbResults<TmdbShow> =
                    self.get_json("discover/tv", &query.to_params()).await?;

                tracing::info!(
                    genre = ?query.genre,
                    sort = query.sort.as_str(),
                    page = query.page,
                    results = page.results.len(),
                    provider = "tmdb",
                    "Discover completed"
                );

                Ok::<_, AppError>(page.results)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
