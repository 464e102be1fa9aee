//! Member API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateMemberRequest, Member, MemberRole};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MemberListQuery {
    pub role: Option<MemberRole>,
}

/// GET /api/members - List all members, optionally filtered by role.
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> ApiResult<Vec<Member>> {
    let members = match query.role {
        Some(role) => state.repo.members_by_role(role).await?,
        None => state.repo.list_members().await?,
    };
    success(members)
}

/// GET /api/members/:id - Get a single member.
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Member> {
    match state.repo.get_member(&id).await? {
        Some(member) => success(member),
        None => Err(AppError::NotFound(format!("Member {} not found", id))),
    }
}

/// POST /api/admin/members - Create a new member.
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<Member> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Member name is required".to_string()));
    }

    let created = state.repo.add_member(&request).await?;

    // Re-read after the write: the stored copy is authoritative.
    match state.repo.get_member(&created.id).await? {
        Some(member) => success(member),
        None => Err(AppError::Internal(
            "Member was not readable after write".to_string(),
        )),
    }
}

/// DELETE /api/admin/members/:id - Delete a member.
///
/// Removing an unknown ID succeeds and changes nothing.
pub async fn delete_member(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.remove_member(&id).await?;
    success(())
}
