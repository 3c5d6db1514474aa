// handlers/public/mod.rs - Public handlers (no authentication required)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::DatabaseError;

pub mod auth; // POST /auth/login

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "XTI Admin API",
        "version": version,
        "endpoints": {
            "auth": "/auth/login (public - token acquisition)",
            "health": "/health (public)",
            "process_data": "/api/process-data[/:id[/ocr]] (protected)",
            "file_pod": "/api/file-pod[/:fileId] (protected)",
            "settings": "/api/settings/connection (protected)",
            "files": "/api/files/:filename (protected)",
            "mail": "/api/mail (protected, admin)",
        }
    }))
}

/// GET /health - Ping both backends
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let document = state.document_jobs.ping().await;
    let relational = state.relational_jobs.ping().await;
    let describe = |r: &Result<(), DatabaseError>| match r {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            "unavailable".to_string()
        }
    };

    let status = if document.is_ok() && relational.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "timestamp": now,
            "document": describe(&document),
            "relational": describe(&relational),
        })),
    )
}
