pub mod library;
pub mod ranking;
pub mod show;

pub use library::{
    BlockList, BlockedSeries, InvalidRating, LibraryItem, ShowRef, UserLibrary, WatchlistChange,
    WatchlistItem, LIKED_THRESHOLD,
};
pub use ranking::{
    CandidateItem, Embedding, MemoryItem, MemorySource, RankRequest, ScoredCandidate,
};
pub use show::{
    default_language, most_popular, DiscoverQuery, DiscoverSort, ExternalIds, Genre, GenreList,
    TmdbResults, TmdbReview, TmdbShow, TmdbVideo,
};
