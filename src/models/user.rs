//! Admin principal record, written once at provisioning time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A provisioned admin principal, stored at `users/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for provisioning an admin principal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionAdminRequest {
    pub email: String,
}

/// Outcome of admin provisioning. A duplicate is a notice, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProvisioned {
    pub uid: String,
    pub created: bool,
    pub message: String,
}
