use std::path::PathBuf;

use axum::http::StatusCode;
use axum::Json;
use library::TrackCache;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct AppState {
    pub tracks: TrackCache,
    pub music_root: PathBuf,
    pub web_dist: PathBuf,
    pub body_limit: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Raw query values; anything that does not parse as an integer falls back
/// to the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct TrackListQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub count: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub filename: String,
    pub path: String,
}

pub type JsonResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;
