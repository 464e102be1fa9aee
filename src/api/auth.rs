//! Login and logout endpoints.

use axum::{extract::State, http::header, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/auth/login - Exchange admin credentials for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let token = state.sessions.login(&request.email, &request.password)?;
    success(LoginResponse { token })
}

/// POST /api/auth/logout - Revoke the presented session token.
///
/// Revoking an unknown or absent token still succeeds.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    if let Some(token) = token {
        state.sessions.revoke(token);
    }
    success(())
}
