use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::Role;
use crate::database::models::FilePodRecord;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::audit::{record_best_effort, AuditEntry};
use crate::services::{erase_file_pod, EraseError};

#[derive(Debug, Default, Deserialize)]
pub struct DeleteFilePodRequest {
    #[serde(rename = "fileId", default)]
    pub file_id: Option<String>,
}

/// DELETE /api/file-pod - Remove a file's stamp requirements and POD row in one transaction
///
/// Expected Input: `{ "fileId": "F100" }`
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Option<Json<DeleteFilePodRequest>>,
) -> Result<Json<Value>, ApiError> {
    user.require(Role::Admin)?;

    let file_id = payload
        .and_then(|Json(body)| body.file_id)
        .filter(|id| !id.trim().is_empty())
        .ok_or(EraseError::MissingFileId)?;

    let outcome = erase_file_pod(state.pods.as_ref(), &file_id).await?;

    record_best_effort(
        state.audit.as_ref(),
        state.config.security.enable_audit_logging,
        AuditEntry::new("file_pod.delete", &user.username, &outcome.file_id),
    )
    .await;

    Ok(Json(json!({ "message": "Records deleted successfully" })))
}

/// GET /api/file-pod/:file_id
pub async fn show(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<FilePodRecord>, ApiError> {
    state
        .pods
        .find(&file_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("File-POD record {} not found", file_id)))
}
