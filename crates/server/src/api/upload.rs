use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::state::{AppState, ErrorResponse, JsonResult, UploadResponse};
use crate::uploads::{upload_filename, PartialUpload};
use crate::utils::{json_error, now_secs};

const FILE_FIELD: &str = "file";

pub async fn add_track(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> JsonResult<UploadResponse> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            warn!("Upload without a multipart body: {}", rejection);
            return Err(json_error(StatusCode::BAD_REQUEST, "File not found in request"));
        }
    };
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                warn!("Malformed upload form: {}", err);
                return Err(json_error(err.status(), "Malformed form data"));
            }
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        return store_file(&state, field).await;
    }

    Err(json_error(StatusCode::BAD_REQUEST, "File not found in request"))
}

async fn store_file(state: &AppState, mut field: Field<'_>) -> JsonResult<UploadResponse> {
    let is_audio = field
        .content_type()
        .map(|value| value.starts_with("audio"))
        .unwrap_or(false);
    if !is_audio {
        return Err(json_error(StatusCode::BAD_REQUEST, "Wrong file type"));
    }

    let filename = match field
        .file_name()
        .and_then(|name| upload_filename(name, now_secs()))
    {
        Some(filename) => filename,
        None => return Err(json_error(StatusCode::BAD_REQUEST, "Missing file name")),
    };

    if let Err(err) = tokio::fs::create_dir_all(&state.music_root).await {
        warn!("Failed to create {}: {}", state.music_root.display(), err);
        return Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, "Can't create dir"));
    }

    let mut upload = PartialUpload::create(&state.music_root, &filename)
        .await
        .map_err(|err| save_error(&filename, err))?;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                warn!("Upload of {} interrupted: {}", filename, err);
                return Err(json_error(err.status(), "Error reading upload"));
            }
        };
        upload
            .write_chunk(&chunk)
            .await
            .map_err(|err| save_error(&filename, err))?;
    }
    let path = upload
        .commit()
        .await
        .map_err(|err| save_error(&filename, err))?;
    info!("Saved upload {}", path.display());

    Ok(Json(UploadResponse {
        message: "File uploaded",
        filename,
        path: path.display().to_string(),
    }))
}

fn save_error(filename: &str, err: std::io::Error) -> (StatusCode, Json<ErrorResponse>) {
    warn!("Failed to save {}: {}", filename, err);
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Error on save file")
}
