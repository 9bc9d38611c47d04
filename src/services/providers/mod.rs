//! TV catalog provider abstraction
//!
//! Routes talk to the catalog only through [`CatalogProvider`], so the TMDB
//! client can be swapped for a stub in tests or another metadata source.

use crate::{
    error::AppResult,
    models::{default_language, most_popular, DiscoverQuery, Genre, TmdbShow},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search TV series by name
    ///
    /// A blank query returns no results without calling upstream.
    async fn search_tv(&self, query: &str, language: &str) -> AppResult<Vec<TmdbShow>>;

    /// Best single match for a title: the most popular search result
    async fn find_tv(&self, title: &str) -> AppResult<Option<TmdbShow>> {
        let results = self.search_tv(title, &default_language()).await?;
        Ok(most_popular(results))
    }

    /// Full details for one series, including videos, reviews and external IDs
    async fn tv_details(&self, id: u64) -> AppResult<TmdbShow>;

    async fn top_rated(&self) -> AppResult<Vec<TmdbShow>>;

    async fn popular(&self) -> AppResult<Vec<TmdbShow>>;

    async fn genres(&self, language: &str) -> AppResult<Vec<Genre>>;

    /// Browse the catalog by genre and sort order
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<Vec<TmdbShow>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
