use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, DocumentStore};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{
    AuditLog, DocumentAuditLog, DocumentJobStore, DocumentSettingStore, DocumentUserStore, FileServer,
    HttpMailer, HttpOcrClient, JobStore, Mailer, OcrService, PgPodStore, PodStore, RelationalJobStore,
    SettingStore, UserStore,
};

/// Everything a handler needs, passed explicitly through axum state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub document_jobs: Arc<dyn JobStore>,
    pub relational_jobs: Arc<dyn JobStore>,
    pub settings: Arc<dyn SettingStore>,
    pub pods: Arc<dyn PodStore>,
    pub users: Arc<dyn UserStore>,
    pub audit: Arc<dyn AuditLog>,
    pub mailer: Arc<dyn Mailer>,
    pub ocr: Arc<dyn OcrService>,
    pub files: Arc<FileServer>,
}

impl AppState {
    /// Open both pools and wire the database-backed stores and HTTP collaborators.
    pub async fn connect(config: Arc<AppConfig>) -> Result<(Self, DatabaseManager), DatabaseError> {
        let manager = DatabaseManager::connect(&config.database).await?;
        let documents = DocumentStore::new(manager.document_pool().clone());
        let relational = manager.relational_pool().clone();
        let client = reqwest::Client::new();

        let state = Self {
            document_jobs: Arc::new(DocumentJobStore::new(documents.clone())),
            relational_jobs: Arc::new(RelationalJobStore::new(relational.clone())),
            settings: Arc::new(DocumentSettingStore::new(documents.clone())),
            pods: Arc::new(PgPodStore::new(relational)),
            users: Arc::new(DocumentUserStore::new(documents.clone())),
            audit: Arc::new(DocumentAuditLog::new(documents)),
            mailer: Arc::new(HttpMailer::new(client.clone(), config.mail.clone())),
            ocr: Arc::new(HttpOcrClient::new(client, config.ocr.clone())),
            files: Arc::new(FileServer::new(config.files.upload_dir.clone())),
            config,
        };
        Ok((state, manager))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = state.config.api.max_request_size_bytes;

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login", post(public::auth::login))
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{file_pod, files, mail, process_data, settings};

    Router::new()
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route("/api/process-data", get(process_data::list))
        .route(
            "/api/process-data/:id",
            get(process_data::show).put(process_data::replace),
        )
        .route("/api/process-data/:id/ocr", post(process_data::run_ocr))
        .route("/api/file-pod", delete(file_pod::delete))
        .route("/api/file-pod/:file_id", get(file_pod::show))
        .route(
            "/api/settings/connection",
            get(settings::get_connection).post(settings::update_connection),
        )
        .route("/api/files/:filename", get(files::serve))
        .route("/api/mail", post(mail::send))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE])
}
