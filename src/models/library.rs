use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::TmdbShow;

/// Ratings at or above this count as "liked" for the taste profile
pub const LIKED_THRESHOLD: u8 = 7;
pub const MAX_RATING: u8 = 10;

/// Show fields the client sends when acting on a show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowRef {
    pub tmdb_id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

/// A show the user has rated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryItem {
    pub tmdb_id: u64,
    pub title: String,
    /// User rating, 1-10
    pub rating: u8,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub first_air_date: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// A show saved for later
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistItem {
    pub tmdb_id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub added_at: DateTime<Utc>,
}

/// A show the user never wants recommended or listed again
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockedSeries {
    pub tmdb_id: u64,
    pub title: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Rating must be between 0 and 10, got {0}")]
pub struct InvalidRating(pub i64);

/// Whether a watchlist toggle added or removed the show
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WatchlistChange {
    Added,
    Removed,
}

/// Owned copy of the user's blocked shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockList {
    ids: HashSet<u64>,
    /// Lower-cased titles
    titles: HashSet<String>,
}

impl BlockList {
    pub fn contains_id(&self, tmdb_id: u64) -> bool {
        self.ids.contains(&tmdb_id)
    }

    /// Case-insensitive title match
    pub fn contains_title(&self, title: &str) -> bool {
        self.titles.contains(&title.to_lowercase())
    }

    pub fn contains_show(&self, show: &TmdbShow) -> bool {
        self.contains_id(show.id) || self.contains_title(&show.name)
    }

    /// Drops blocked shows, by ID or title, from a catalog listing
    pub fn filter(&self, shows: Vec<TmdbShow>) -> Vec<TmdbShow> {
        shows
            .into_iter()
            .filter(|s| !self.contains_show(s))
            .collect()
    }

    /// Blocked IDs in the string form ranking candidates use
    pub fn candidate_ids(&self) -> HashSet<String> {
        self.ids.iter().map(|id| id.to_string()).collect()
    }
}

/// Everything the user has told us about their taste
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserLibrary {
    /// Rated shows, highest rating first
    pub rated: Vec<LibraryItem>,
    /// Watchlist, most recently added first
    pub watchlist: Vec<WatchlistItem>,
    pub blocked: Vec<BlockedSeries>,
}

impl UserLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rates a show, replacing any previous rating
    ///
    /// A rating of 0 removes the show from the rated list. A positive rating
    /// also takes the show off the watchlist.
    pub fn rate(&mut self, show: ShowRef, rating: u8) -> Result<(), InvalidRating> {
        if rating > MAX_RATING {
            return Err(InvalidRating(rating.into()));
        }

        self.rated.retain(|r| r.tmdb_id != show.tmdb_id);

        if rating == 0 {
            return Ok(());
        }

        self.watchlist.retain(|w| w.tmdb_id != show.tmdb_id);

        self.rated.insert(
            0,
            LibraryItem {
                tmdb_id: show.tmdb_id,
                title: show.title,
                rating,
                poster_path: show.poster_path,
                vote_average: show.vote_average,
                first_air_date: show.first_air_date,
                added_at: Utc::now(),
            },
        );
        // Stable: the new entry stays ahead of older ones with the same rating
        self.rated.sort_by(|a, b| b.rating.cmp(&a.rating));

        Ok(())
    }

    /// Shows rated at or above [`LIKED_THRESHOLD`]
    pub fn liked(&self) -> Vec<&LibraryItem> {
        self.rated
            .iter()
            .filter(|r| r.rating >= LIKED_THRESHOLD)
            .collect()
    }

    /// Adds the show to the watchlist, or removes it if already listed
    pub fn toggle_watchlist(&mut self, show: ShowRef) -> WatchlistChange {
        if self.in_watchlist(show.tmdb_id) {
            self.watchlist.retain(|w| w.tmdb_id != show.tmdb_id);
            return WatchlistChange::Removed;
        }

        self.watchlist.insert(
            0,
            WatchlistItem {
                tmdb_id: show.tmdb_id,
                title: show.title,
                poster_path: show.poster_path,
                vote_average: show.vote_average,
                added_at: Utc::now(),
            },
        );
        WatchlistChange::Added
    }

    pub fn in_watchlist(&self, tmdb_id: u64) -> bool {
        self.watchlist.iter().any(|w| w.tmdb_id == tmdb_id)
    }

    /// Blocks a show and purges it from the rated list and watchlist
    ///
    /// Returns false if the show was already blocked.
    pub fn block(&mut self, series: BlockedSeries) -> bool {
        if self.is_blocked(series.tmdb_id) {
            return false;
        }

        self.rated.retain(|r| r.tmdb_id != series.tmdb_id);
        self.watchlist.retain(|w| w.tmdb_id != series.tmdb_id);
        self.blocked.push(series);
        true
    }

    /// Returns false if the show was not blocked
    pub fn unblock(&mut self, tmdb_id: u64) -> bool {
        let before = self.blocked.len();
        self.blocked.retain(|b| b.tmdb_id != tmdb_id);
        self.blocked.len() != before
    }

    pub fn is_blocked(&self, tmdb_id: u64) -> bool {
        self.blocked.iter().any(|b| b.tmdb_id == tmdb_id)
    }

    /// Snapshot of the blocked list for filtering outside the library lock
    pub fn block_list(&self) -> BlockList {
        BlockList {
            ids: self.blocked.iter().map(|b| b.tmdb_id).collect(),
            titles: self.blocked.iter().map(|b| b.title.to_lowercase()).collect(),
        }
    }

    pub fn reset(&mut self) {
        self.rated.clear();
        self.watchlist.clear();
        self.blocked.clear();
    }
}
