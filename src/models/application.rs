//! Join application model.
//!
//! The `applications` path is world-writable by declared policy; nothing in
//! the current views reads it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ServerPlatform;

/// A submitted join application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub minecraft_username: String,
    pub discord_username: String,
    pub platforms: Vec<ServerPlatform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Request body for the public join form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub minecraft_username: String,
    pub discord_username: String,
    #[serde(default)]
    pub platforms: Vec<ServerPlatform>,
    #[serde(default)]
    pub answer: Option<String>,
}
