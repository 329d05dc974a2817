pub mod tracks;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/tracks", get(tracks::list_tracks))
        .route("/tracks/refresh", get(tracks::refresh_tracks))
        .route(
            "/tracks/add",
            post(upload::add_track).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
