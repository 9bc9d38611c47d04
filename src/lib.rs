//! TV-series discovery API: TMDB catalog access, a per-user library of
//! ratings, watchlist and blocked shows, and a blended similarity scorer
//! for recommendation candidates.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
