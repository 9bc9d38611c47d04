use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    models::UserLibrary,
    services::providers::CatalogProvider,
};

pub mod catalog;
pub mod library;
pub mod rank;

/// Shared application state
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    /// The single user's library, held for the lifetime of the process
    pub library: RwLock<UserLibrary>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            catalog,
            library: RwLock::new(UserLibrary::new()),
        }
    }
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            // Outermost first: the request ID is assigned before the trace span opens
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog
        .route("/catalog/search", get(catalog::search))
        .route("/catalog/lookup", get(catalog::lookup))
        .route("/catalog/shows/:id", get(catalog::details))
        .route("/catalog/popular", get(catalog::popular))
        .route("/catalog/top-rated", get(catalog::top_rated))
        .route("/catalog/genres", get(catalog::genres))
        .route("/catalog/discover", get(catalog::discover))
        // Library
        .route("/library", get(library::get_library).delete(library::reset))
        .route("/library/ratings", post(library::rate))
        .route("/library/liked", get(library::liked))
        .route("/library/watchlist/toggle", post(library::toggle_watchlist))
        .route("/library/blocked", post(library::block))
        .route("/library/blocked/:tmdb_id", delete(library::unblock))
        // Ranking
        .route("/rank", post(rank::rank))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
