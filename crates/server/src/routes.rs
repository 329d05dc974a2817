use axum::Router;
use common::TRACKS_PREFIX;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api::api_router;
use crate::assets::{music_files, spa_files};
use crate::state::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router(state.clone()))
        .nest_service(TRACKS_PREFIX, music_files(&state.music_root))
        .fallback_service(spa_files(&state.web_dist))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
}
