//! Join application endpoint.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Application, SubmitApplicationRequest};
use crate::AppState;

/// POST /api/applications - Submit a join application.
///
/// Open to unauthenticated visitors: the applications path is
/// world-writable by declared policy.
pub async fn submit_application(
    State(state): State<AppState>,
    Json(request): Json<SubmitApplicationRequest>,
) -> ApiResult<Application> {
    if request.minecraft_username.trim().is_empty() {
        return Err(AppError::Validation(
            "Minecraft username is required".to_string(),
        ));
    }
    if request.discord_username.trim().is_empty() {
        return Err(AppError::Validation(
            "Discord username is required".to_string(),
        ));
    }

    let application = state.repo.add_application(&request).await?;
    success(application)
}
