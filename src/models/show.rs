use serde::{Deserialize, Serialize};

/// A TV series as returned by TMDB
///
/// List endpoints fill only the summary fields. Detail lookups append
/// videos, reviews and external IDs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbShow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<TmdbResults<TmdbVideo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<TmdbResults<TmdbReview>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ids: Option<ExternalIds>,
}

impl TmdbShow {
    /// YouTube trailer URL, if TMDB lists one
    pub fn trailer_url(&self) -> Option<String> {
        self.videos
            .as_ref()?
            .results
            .iter()
            .find(|v| v.site == "YouTube" && v.video_type == "Trailer")
            .map(|v| format!("https://www.youtube.com/watch?v={}", v.key))
    }
}

/// Generic TMDB `{ "results": [...] }` envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbResults<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbVideo {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbReview {
    pub id: String,
    pub author: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// TMDB `/genre/tv/list` response
#[derive(Debug, Clone, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Catalog ordering for the discover endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DiscoverSort {
    #[default]
    #[serde(rename = "popularity.desc")]
    Popularity,
    #[serde(rename = "vote_average.desc")]
    Rating,
    #[serde(rename = "first_air_date.desc")]
    Newest,
}

impl DiscoverSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoverSort::Popularity => "popularity.desc",
            DiscoverSort::Rating => "vote_average.desc",
            DiscoverSort::Newest => "first_air_date.desc",
        }
    }

    /// Vote floors that keep low-signal shows out of rating and recency sorts
    pub fn extra_filters(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            DiscoverSort::Popularity => &[],
            DiscoverSort::Rating => &[("vote_count.gte", "300")],
            DiscoverSort::Newest => &[("vote_count.gte", "100"), ("vote_average.gte", "1")],
        }
    }
}

/// Catalog browse parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DiscoverQuery {
    #[serde(default)]
    pub genre: Option<u64>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub sort: DiscoverSort,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for DiscoverQuery {
    fn default() -> Self {
        Self {
            genre: None,
            page: default_page(),
            sort: DiscoverSort::default(),
            language: default_language(),
        }
    }
}

impl DiscoverQuery {
    /// Query parameters for TMDB `/discover/tv`, excluding the API key
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("language", self.language.clone()),
            ("sort_by", self.sort.as_str().to_string()),
            ("page", self.page.to_string()),
        ];

        if let Some(genre) = self.genre {
            params.push(("with_genres", genre.to_string()));
        }

        for &(key, value) in self.sort.extra_filters() {
            params.push((key, value.to_string()));
        }

        params
    }
}

fn default_page() -> u32 {
    1
}

pub fn default_language() -> String {
    "en-US".to_string()
}

/// Picks the most popular show, keeping the earliest on ties
pub fn most_popular(shows: Vec<TmdbShow>) -> Option<TmdbShow> {
    shows.into_iter().fold(None, |best, show| match best {
        Some(current) if current.popularity >= show.popularity => Some(current),
        _ => Some(show),
    })
}
