//! Setup endpoints: database seeding and admin provisioning.

use axum::{extract::State, Json};
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{AdminProvisioned, ProvisionAdminRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SetupState {
    pub initialized: bool,
}

/// GET /api/admin/setup/state - Whether the store holds the records the
/// dashboard needs. An empty store directs the operator to the seeding
/// flow instead of a broken dashboard.
pub async fn setup_state(State(state): State<AppState>) -> ApiResult<SetupState> {
    let initialized = state.repo.is_initialized().await?;
    success(SetupState { initialized })
}

/// POST /api/admin/setup/database - Seed the store with bundled defaults.
pub async fn seed_database(State(state): State<AppState>) -> ApiResult<SetupState> {
    state.repo.seed_database().await?;
    success(SetupState { initialized: true })
}

/// POST /api/admin/setup/admin - Provision an admin principal.
///
/// Provisioning an email that already exists returns a non-fatal notice
/// with `created: false`.
pub async fn provision_admin(
    State(state): State<AppState>,
    Json(request): Json<ProvisionAdminRequest>,
) -> ApiResult<AdminProvisioned> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    let outcome = state.repo.provision_admin(email).await?;
    success(outcome)
}
