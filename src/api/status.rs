//! Server-status API endpoints.
//!
//! Reads come straight from the synchronizer cache and never block on the
//! store; writes go through the synchronizer so every subscribed view sees
//! the echoed change.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::models::{ServerStatus, SetPlayerCountRequest};
use crate::AppState;

/// GET /api/status - Current cached server status.
pub async fn get_status(State(state): State<AppState>) -> ApiResult<ServerStatus> {
    success(state.status.snapshot())
}

/// POST /api/admin/status/toggle - Flip the online flag.
pub async fn toggle_status(State(state): State<AppState>) -> ApiResult<ServerStatus> {
    success(state.status.toggle_online().await)
}

/// PUT /api/admin/status/players - Set the player count.
///
/// Counts above capacity are accepted and stored verbatim.
pub async fn set_player_count(
    State(state): State<AppState>,
    Json(request): Json<SetPlayerCountRequest>,
) -> ApiResult<ServerStatus> {
    success(state.status.set_player_count(request.count).await)
}
