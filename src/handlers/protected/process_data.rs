use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::auth::Role;
use crate::database::models::{is_valid_record_id, JobRecord, JobUpdate};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::audit::{record_best_effort, AuditEntry};
use crate::services::{fetch_jobs, select_reader, Backend, JobPage, Pagination};

const RETRIEVAL_ERROR: &str = "Error retrieving process data";

/// Raw query values; parsing happens in `Pagination::from_query` so that
/// non-numeric input falls back to defaults instead of being rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Read the Connection Setting once for this request.
async fn resolve_backend(state: &AppState) -> Result<Backend, ApiError> {
    let setting = state.settings.connection().await.map_err(|e| {
        tracing::error!("Failed to read connection setting: {}", e);
        ApiError::internal_server_error(RETRIEVAL_ERROR)
    })?;
    Ok(Backend::from_setting(setting.as_ref().map(|s| s.data_base.as_str())))
}

fn validate_id(id: &str) -> Result<(), ApiError> {
    if !is_valid_record_id(id) {
        return Err(ApiError::validation_error(format!("Invalid record id: {}", id)));
    }
    Ok(())
}

async fn find_job(state: &AppState, backend: Backend, id: &str) -> Result<JobRecord, ApiError> {
    let store = select_reader(backend, state.document_jobs.as_ref(), state.relational_jobs.as_ref());
    store
        .find(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read job {} from {:?}: {}", id, backend, e);
            ApiError::internal_server_error(RETRIEVAL_ERROR)
        })?
        .ok_or_else(|| ApiError::not_found(format!("Record {} not found", id)))
}

/// GET /api/process-data?page=&limit= - One page of jobs from the authoritative backend
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<JobPage>, ApiError> {
    let api = &state.config.api;
    let pagination = Pagination::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        api.default_page_limit,
        api.max_page_limit,
    );
    let backend = resolve_backend(&state).await?;

    let page = fetch_jobs(
        backend,
        state.document_jobs.as_ref(),
        state.relational_jobs.as_ref(),
        pagination,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch jobs from {:?}: {}", backend, e);
        ApiError::internal_server_error(RETRIEVAL_ERROR)
    })?;

    Ok(Json(page))
}

/// GET /api/process-data/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, ApiError> {
    validate_id(&id)?;
    let backend = resolve_backend(&state).await?;
    Ok(Json(find_job(&state, backend, &id).await?))
}

/// PUT /api/process-data/:id - Replace the whole record
pub async fn replace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<JobUpdate>,
) -> Result<Json<JobRecord>, ApiError> {
    user.require(Role::Operator)?;
    validate_id(&id)?;
    let backend = resolve_backend(&state).await?;

    let existing = find_job(&state, backend, &id).await?;
    let record = update.into_record(&id, existing.created_at, Utc::now());

    let store = select_reader(backend, state.document_jobs.as_ref(), state.relational_jobs.as_ref());
    if !store.replace(&record).await? {
        return Err(ApiError::not_found(format!("Record {} not found", id)));
    }

    tracing::info!("Job {} replaced in {:?} backend by {}", id, backend, user.username);
    record_best_effort(
        state.audit.as_ref(),
        state.config.security.enable_audit_logging,
        AuditEntry::new("job.replace", &user.username, &id),
    )
    .await;

    Ok(Json(record))
}

/// POST /api/process-data/:id/ocr - Run OCR for a job and return the service's answer
pub async fn run_ocr(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    user.require(Role::Operator)?;
    validate_id(&id)?;
    let backend = resolve_backend(&state).await?;
    let job = find_job(&state, backend, &id).await?;

    let result = state.ocr.invoke(&job).await?;
    Ok(Json(result))
}
