use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::Role;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::audit::{record_best_effort, AuditEntry};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateConnectionRequest {
    #[serde(rename = "dbType", default)]
    pub db_type: Option<String>,
}

/// GET /api/settings/connection
pub async fn get_connection(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let setting = state.settings.connection().await.map_err(|e| {
        tracing::error!("Failed to read connection setting: {}", e);
        ApiError::internal_server_error("Error retrieving connection setting")
    })?;

    match setting {
        Some(setting) => Ok(Json(json!({ "dataBase": setting.data_base }))),
        None => Err(ApiError::not_found("Connection setting not found")),
    }
}

/// POST /api/settings/connection - `{ "dbType": "local" }`
pub async fn update_connection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateConnectionRequest>,
) -> Result<Json<Value>, ApiError> {
    user.require(Role::Admin)?;

    let db_type = payload
        .db_type
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation_error("dbType is required"))?;

    let setting = state.settings.set_connection(db_type).await.map_err(|e| {
        tracing::error!("Failed to write connection setting: {}", e);
        ApiError::internal_server_error("Error updating connection setting")
    })?;

    tracing::info!("Connection setting changed to '{}' by {}", setting.data_base, user.username);
    record_best_effort(
        state.audit.as_ref(),
        state.config.security.enable_audit_logging,
        AuditEntry::new("settings.connection", &user.username, &setting.data_base),
    )
    .await;

    Ok(Json(json!({
        "message": "Connection setting updated successfully",
        "dataBase": setting.data_base,
    })))
}
