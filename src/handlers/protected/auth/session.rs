use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /api/auth/whoami - Identity carried by the bearer token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "username": user.username,
        "role": user.role,
    }))
}
