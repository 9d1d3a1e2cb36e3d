use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::SharedState;

/// Caller identity taken from a validated access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl AuthUser {
    /// Resolve the caller from `Authorization: Bearer <token>`.
    pub fn from_headers(headers: &HeaderMap, secret: &str) -> Result<Self, AppError> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Please log in".to_string()))?;

        let claims = jwt::decode_access(token, secret).map_err(|e| {
            tracing::debug!("Rejected access token: {e}");
            AppError::Unauthorized("Token is invalid or expired, please log in again".to_string())
        })?;

        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
            permissions: claims.permissions,
        })
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // The access guard has usually resolved the caller already
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        AuthUser::from_headers(&parts.headers, &state.config.jwt_secret)
    }
}
