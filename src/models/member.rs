//! Community member model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role a member holds in the community.
///
/// At steady state exactly one member carries [`MemberRole::Owner`]; the
/// store does not enforce this, it is an editorial invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Leader,
    Member,
}

/// A member of the LordSMP community.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request body for adding a member through the admin dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub name: String,
    #[serde(default = "default_role")]
    pub role: MemberRole,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub discord_username: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_role() -> MemberRole {
    MemberRole::Member
}
