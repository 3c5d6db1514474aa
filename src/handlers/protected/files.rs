use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/files/:filename - Uploaded file with its MIME type inferred from the extension
pub async fn serve(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let file = state.files.read(&filename).await?;
    tracing::debug!("Serving {} ({}, {} bytes)", file.name, file.content_type, file.bytes.len());

    let disposition = format!("inline; filename=\"{}\"", file.name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    ))
}
