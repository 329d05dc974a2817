use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use common::Track;
use tracing::warn;

use crate::state::{AppState, JsonResult, RefreshResponse, TrackListQuery};
use crate::utils::{json_error, query_int};

const DEFAULT_OFFSET: i64 = 0;
const DEFAULT_LIMIT: i64 = 10;

pub async fn list_tracks(
    State(state): State<AppState>,
    Query(params): Query<TrackListQuery>,
) -> Json<Vec<Track>> {
    let offset = query_int(params.offset.as_deref(), DEFAULT_OFFSET);
    let limit = query_int(params.limit.as_deref(), DEFAULT_LIMIT);
    Json(state.tracks.list(offset, limit))
}

pub async fn refresh_tracks(State(state): State<AppState>) -> JsonResult<RefreshResponse> {
    let tracks = state.tracks.clone();
    match tokio::task::spawn_blocking(move || tracks.refresh()).await {
        Ok(Ok(summary)) => Ok(Json(RefreshResponse {
            status: "ok",
            count: summary.count,
            skipped: summary.skipped.len(),
        })),
        Ok(Err(err)) => Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())),
        Err(err) => {
            warn!("Refresh task join error: {}", err);
            Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("refresh failed: {}", err),
            ))
        }
    }
}
