use std::sync::Arc;

use crate::media::library::MovieLibrary;
use crate::media::stream::MediaRoot;

/// Shared application state injected into all route handlers via axum::extract::State.
/// Both members are immutable after startup; concurrent requests share them read-only.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<MovieLibrary>,
    pub media: Arc<MediaRoot>,
}
