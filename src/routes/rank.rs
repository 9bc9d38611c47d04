use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RankRequest, ScoredCandidate},
    routes::AppState,
    services::recommendations,
};

/// Handler for the ranking endpoint
///
/// The user's blocked shows are excluded alongside any IDs the request lists.
pub async fn rank(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RankRequest>,
) -> AppResult<Json<Vec<ScoredCandidate>>> {
    tracing::info!(
        request_id = %request_id,
        candidates = request.candidates.len(),
        memory = request.memory.len(),
        "Processing ranking request"
    );

    let blocked = state.library.read().await.block_list().candidate_ids();
    let ranked = recommendations::rank_candidates(&request, blocked)?;

    Ok(Json(ranked))
}
