pub mod error;
pub mod media;
pub mod movies;
pub mod state;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::http::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/movies", get(movies::list_movies))
        .route(
            "/api/stream/{file}",
            get(media::serve_stream_get).head(media::serve_stream_head),
        )
        .layer(TraceLayer::new_for_http())
        // The browsing UI is served from its own origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
