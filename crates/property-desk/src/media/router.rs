use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    handler::HandlerWithoutStateExt,
    routing::post,
    Json, Router,
};
use serde_json::json;
use tower_http::services::ServeDir;

use super::store::{MediaUpload, ObjectStore, UploadError};
use crate::access::{AccessGate, AdminAccess, GuardedState};
use crate::error::ApiError;

/// Largest accepted upload; walkthrough videos need far more than axum's 2 MB default.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const UPLOAD_FIELD: &str = "image";

type MediaState<O> = GuardedState<O>;

/// Router builder exposing the admin upload and the files under `served_dir` at `/uploads`.
///
/// `ServeDir` handles content types, conditional and range requests, and rejects paths that
/// climb out of the directory.
pub fn media_router<O>(store: Arc<O>, served_dir: impl Into<PathBuf>, gate: AccessGate) -> Router
where
    O: ObjectStore + 'static,
{
    let files = ServeDir::new(served_dir.into()).not_found_service(file_not_found.into_service());

    Router::new()
        .route(
            "/api/upload",
            post(upload_handler::<O>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .nest_service("/uploads", files)
        .with_state(GuardedState::new(store, gate))
}

pub(crate) async fn upload_handler<O>(
    State(state): State<MediaState<O>>,
    _admin: AdminAccess,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError>
where
    O: ObjectStore + 'static,
{
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some(MediaUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or(UploadError::MissingFile)?;
    let url = state.service.upload(upload).await?;
    Ok(Json(json!({
        "message": "Image Uploaded",
        "filePath": url,
    })))
}

async fn file_not_found() -> ApiError {
    ApiError::NotFound("File not found")
}
