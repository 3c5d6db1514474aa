use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::Role;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::MailMessage;

/// POST /api/mail - `{ "to", "subject", "text" }`
pub async fn send(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(message): Json<MailMessage>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.require(Role::Admin)?;
    message.validate()?;

    state.mailer.send(&message).await?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "message": "Email sent" }))))
}
