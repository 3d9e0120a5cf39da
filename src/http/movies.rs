use axum::{extract::State, Json};

use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::media::library::MovieRecord;

/// GET /api/movies: every movie file in the media directory, enriched, in scan order.
pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<MovieRecord>>, ApiError> {
    let movies = state.library.list_movies().await?;
    Ok(Json(movies))
}
