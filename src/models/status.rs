//! Server status model.
//!
//! `ServerStatus` is a singleton record: one copy lives in the document store
//! at `serverStatus` and one cached copy lives in the process-wide
//! synchronizer. All multi-field changes go through the immutable update
//! constructors below so the two copies never alias.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform a player can connect from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerPlatform {
    Java,
    Bedrock,
    Pocket,
    Windows,
}

/// The live status record for the Minecraft server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub is_online: bool,
    /// Values above `max_players` are accepted and stored verbatim.
    pub player_count: u32,
    pub max_players: u32,
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub supported_platforms: Vec<ServerPlatform>,
}

impl ServerStatus {
    /// The default snapshot written by the first process to observe an
    /// empty store.
    pub fn seed(now: DateTime<Utc>) -> Self {
        Self {
            is_online: true,
            player_count: 0,
            max_players: 30,
            version: "1.21.4".to_string(),
            last_updated: now,
            supported_platforms: vec![
                ServerPlatform::Java,
                ServerPlatform::Bedrock,
                ServerPlatform::Pocket,
                ServerPlatform::Windows,
            ],
        }
    }

    /// Return a new record with the online flag replaced.
    pub fn with_online(&self, is_online: bool, now: DateTime<Utc>) -> Self {
        Self {
            is_online,
            last_updated: now,
            ..self.clone()
        }
    }

    /// Return a new record with the player count replaced. No clamping:
    /// counts above capacity are kept as-is.
    pub fn with_player_count(&self, player_count: u32, now: DateTime<Utc>) -> Self {
        Self {
            player_count,
            last_updated: now,
            ..self.clone()
        }
    }
}

/// Request body for setting the player count.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPlayerCountRequest {
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_matches_launch_defaults() {
        let status = ServerStatus::seed(Utc::now());
        assert!(status.is_online);
        assert_eq!(status.player_count, 0);
        assert_eq!(status.max_players, 30);
        assert_eq!(status.version, "1.21.4");
        assert_eq!(status.supported_platforms.len(), 4);
    }

    #[test]
    fn with_player_count_does_not_clamp() {
        let base = ServerStatus::seed(Utc::now());
        for count in [0, base.max_players, base.max_players + 1] {
            let updated = base.with_player_count(count, Utc::now());
            assert_eq!(updated.player_count, count);
        }
        // the base record is untouched
        assert_eq!(base.player_count, 0);
    }
}
