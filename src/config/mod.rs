use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub files: FilesConfig,
    pub mail: MailConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL holding the JSONB `documents` collection table
    pub document_url: String,
    /// Postgres URL holding the `xti_*` relational tables
    pub relational_url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub default_page_limit: u32,
    /// Upper bound applied to `limit` on paged reads; `None` leaves it unbounded
    pub max_page_limit: Option<u32>,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_audit_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    pub upload_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub relay_url: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub service_url: Option<String>,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DOCUMENT_DATABASE_URL") {
            self.database.document_url = v;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.relational_url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(port) = env::var("XTI_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_DEFAULT_PAGE_LIMIT") {
            self.api.default_page_limit = v.parse().unwrap_or(self.api.default_page_limit);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_LIMIT") {
            if let Some(limit) = parse_optional_limit(&v) {
                self.api.max_page_limit = limit;
            }
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }

        // Files, mail and OCR collaborators
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.files.upload_dir = v;
        }
        if let Ok(v) = env::var("MAIL_RELAY_URL") {
            self.mail.relay_url = Some(v);
        }
        if let Ok(v) = env::var("MAIL_API_KEY") {
            self.mail.api_key = Some(v);
        }
        if let Ok(v) = env::var("MAIL_FROM") {
            self.mail.from_address = v;
        }
        if let Ok(v) = env::var("OCR_SERVICE_URL") {
            self.ocr.service_url = Some(v);
        }
        if let Ok(v) = env::var("OCR_TIMEOUT_SECS") {
            self.ocr.timeout_secs = v.parse().unwrap_or(self.ocr.timeout_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                document_url: "postgres://localhost:5432/xti_documents".to_string(),
                relational_url: "postgres://localhost:5432/xti".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 100,
                max_page_limit: Some(1000),
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                enable_audit_logging: false,
            },
            files: FilesConfig {
                upload_dir: "uploads".to_string(),
            },
            mail: MailConfig {
                relay_url: None,
                api_key: None,
                from_address: "noreply@localhost".to_string(),
            },
            ocr: OcrConfig {
                service_url: None,
                timeout_secs: 60,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                document_url: String::new(),
                relational_url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 100,
                max_page_limit: Some(500),
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                enable_audit_logging: true,
            },
            files: FilesConfig {
                upload_dir: "/var/lib/xti/uploads".to_string(),
            },
            mail: MailConfig {
                relay_url: None,
                api_key: None,
                from_address: "noreply@staging.example.com".to_string(),
            },
            ocr: OcrConfig {
                service_url: None,
                timeout_secs: 60,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                document_url: String::new(),
                relational_url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 100,
                max_page_limit: Some(100),
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                enable_audit_logging: true,
            },
            files: FilesConfig {
                upload_dir: "/var/lib/xti/uploads".to_string(),
            },
            mail: MailConfig {
                relay_url: None,
                api_key: None,
                from_address: "noreply@example.com".to_string(),
            },
            ocr: OcrConfig {
                service_url: None,
                timeout_secs: 30,
            },
        }
    }
}

/// `none`/`unbounded` clears the limit, a number sets it, anything else is ignored.
fn parse_optional_limit(value: &str) -> Option<Option<u32>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" | "unbounded" | "0" => Some(None),
        other => other.parse::<u32>().ok().map(Some),
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
