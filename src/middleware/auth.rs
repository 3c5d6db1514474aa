use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{validate_jwt, AuthError, Claims, Role};
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// Fails with 403 unless the user's role is at least `required`
    pub fn require(&self, required: Role) -> Result<(), ApiError> {
        if self.role < required {
            tracing::warn!(
                "User '{}' with role '{}' denied an action requiring '{}'",
                self.username, self.role, required
            );
            return Err(AuthError::InsufficientRole { required, actual: self.role }.into());
        }
        Ok(())
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers)?;
    let claims = validate_jwt(token, &state.config.security)?;

    // Convert claims to AuthUser and inject into request
    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated '{}' as {}", auth_user.username, auth_user.role);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MalformedHeader),
    }
}
