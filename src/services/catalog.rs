use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{BlockList, DiscoverQuery, TmdbShow},
    services::providers::CatalogProvider,
};

/// Queries shorter than this return nothing without calling the provider
pub const MIN_SEARCH_CHARS: usize = 3;

/// Search TV series by name, hiding blocked shows
pub async fn search_shows(
    provider: Arc<dyn CatalogProvider>,
    query: &str,
    language: &str,
    blocked: &BlockList,
) -> AppResult<Vec<TmdbShow>> {
    if query.trim().chars().count() < MIN_SEARCH_CHARS {
        return Ok(Vec::new());
    }

    let shows = provider.search_tv(query.trim(), language).await?;
    Ok(blocked.filter(shows))
}

/// Resolve a free-text title to the single best catalog match
///
/// Blocked shows (by ID or by title) are treated as not found.
pub async fn lookup_show(
    provider: Arc<dyn CatalogProvider>,
    title: &str,
    blocked: &BlockList,
) -> AppResult<TmdbShow> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    match provider.find_tv(title.trim()).await? {
        Some(show) if !blocked.contains_show(&show) => Ok(show),
        Some(show) => {
            tracing::debug!(tmdb_id = show.id, "Lookup matched a blocked show");
            Err(AppError::NotFound(format!("No match for '{}'", title)))
        }
        None => Err(AppError::NotFound(format!("No match for '{}'", title))),
    }
}

/// Browse the catalog, hiding blocked shows
pub async fn discover_shows(
    provider: Arc<dyn CatalogProvider>,
    query: &DiscoverQuery,
    blocked: &BlockList,
) -> AppResult<Vec<TmdbShow>> {
    if query.page == 0 {
        return Err(AppError::InvalidInput("Page numbers start at 1".to_string()));
    }

    let shows = provider.discover(query).await?;
    Ok(blocked.filter(shows))
}
