// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::{issue_token, verify_password, AuthError};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /auth/login - Authenticate an admin user and receive a JWT
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI...", "role": "admin", "expiresIn": 604800 }
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let username = payload.username.as_deref().map(str::trim).unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::validation_error("username and password are required"));
    }

    let user = state.users.find_by_username(username).await?;
    let user = match user {
        Some(user) if verify_password(password, &user.password_hash) => user,
        _ => {
            tracing::warn!("Failed login attempt for '{}'", username);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let security = &state.config.security;
    let token = issue_token(&user.username, user.role, security)?;
    tracing::info!("User '{}' logged in as {}", user.username, user.role);

    Ok(Json(json!({
        "token": token,
        "role": user.role,
        "expiresIn": security.jwt_expiry_hours * 3600,
    })))
}
