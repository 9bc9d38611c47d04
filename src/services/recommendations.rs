use std::collections::HashSet;
use std::time::Instant;

use crate::{
    error::AppResult,
    models::{RankRequest, ScoredCandidate},
    services::ranking,
};

/// Ranks the request's candidates for a user
///
/// `blocked` is the user's blocked-show ID set, read by the caller and
/// passed in so the scorer never reaches into shared state. IDs listed in
/// the request's own `exclude` are dropped as well.
pub fn rank_candidates(
    request: &RankRequest,
    blocked: HashSet<String>,
) -> AppResult<Vec<ScoredCandidate>> {
    let start = Instant::now();

    let mut excluded = blocked;
    excluded.extend(request.exclude.iter().cloned());

    let ranked = ranking::rank_excluding(
        &request.candidates,
        &request.memory,
        &request.seed_embedding,
        &excluded,
    )?;

    tracing::info!(
        candidates = request.candidates.len(),
        memory = request.memory.len(),
        excluded = excluded.len(),
        returned = ranked.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Ranking completed"
    );

    Ok(ranked)
}
