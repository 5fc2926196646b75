//! Wire types for the idling backend's `/api/*` endpoints.
//!
//! Shared by the core library and its tests so request and response shapes
//! cannot drift. The backend is the authority on semantics; these types only
//! describe the JSON it accepts and returns.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

pub const STATUS_SUCCESS: &str = "success";

/// Endpoint paths, relative to the backend base URL.
pub mod paths {
    pub const GAME_STATUS: &str = "/api/game-status";
    pub const START_GAME: &str = "/api/start-game";
    pub const STOP_GAME: &str = "/api/stop-game";
    pub const SESSION_TIME: &str = "/api/game-session-time";
    pub const EMERGENCY_STOP: &str = "/api/emergency-stop";
    pub const RUN_PRESET: &str = "/api/run-preset";
    pub const FETCH_GAME: &str = "/api/fetch-game";
    pub const GET_PRESETS: &str = "/api/get-presets";
    pub const SAVE_PRESET: &str = "/api/save-preset";
    pub const DELETE_PRESET: &str = "/api/delete-preset";
    pub const STEAM_STATUS: &str = "/api/steam-status";
    pub const LAUNCH_STEAM: &str = "/api/launch-steam";
    pub const RENAME_PRESET: &str = "/api/rename-preset";
    pub const FAVORITES: &str = "/api/favorites";
    pub const GAME_HISTORY: &str = "/api/game-history";
    pub const GAME_FAVORITES: &str = "/api/game-favorites";
}

// ═══════════════════════════════════════════════════════════════════════════════
// GameId
// ═══════════════════════════════════════════════════════════════════════════════

/// Canonical game identifier.
///
/// The backend treats ids as interchangeable strings and integers. The client
/// keeps exactly one form, a trimmed string, so `42` and `"42"` land on the
/// same set entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(String);

impl GameId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        GameId::new(value)
    }
}

impl From<String> for GameId {
    fn from(value: String) -> Self {
        GameId::new(value)
    }
}

impl From<u64> for GameId {
    fn from(value: u64) -> Self {
        GameId(value.to_string())
    }
}

impl Serialize for GameId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for GameId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GameIdVisitor;

        impl Visitor<'_> for GameIdVisitor {
            type Value = GameId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a game id as a string or an integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<GameId, E> {
                Ok(GameId::new(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<GameId, E> {
                Ok(GameId::from(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<GameId, E> {
                Ok(GameId(value.to_string()))
            }
        }

        deserializer.deserialize_any(GameIdVisitor)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRequest {
    #[serde(rename = "gameId")]
    pub game_id: GameId,
}

impl GameRequest {
    pub fn new(game_id: &GameId) -> Self {
        Self {
            game_id: game_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetNameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePresetRequest {
    pub name: String,
    pub games: Vec<GameInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePresetRequest {
    #[serde(rename = "oldName")]
    pub old_name: String,
    #[serde(rename = "newName")]
    pub new_name: String,
}

/// Body for adding or removing a favourite preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritePresetRequest {
    pub preset_name: String,
}

/// `DELETE` body that empties a history or favourites list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClearAllRequest {
    #[serde(rename = "clearAll")]
    pub clear_all: bool,
}

impl ClearAllRequest {
    pub fn new() -> Self {
        Self { clear_all: true }
    }
}

impl Default for ClearAllRequest {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════════════════════════

/// Generic `{status, message}` envelope most mutating endpoints return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusReply {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatusReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl GameStatusReply {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTimeReply {
    pub current_session: String,
    pub total_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyStopReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stopped_games: Vec<GameId>,
    #[serde(default)]
    pub message: Option<String>,
}

impl EmergencyStopReply {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPresetReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "gameIds")]
    pub game_ids: Vec<GameId>,
    #[serde(default, rename = "runningGames")]
    pub running_games: Vec<GameId>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RunPresetReply {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: GameId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub games: Vec<GameInfo>,
}

impl Preset {
    pub fn game_ids(&self) -> Vec<GameId> {
        self.games.iter().map(|game| game.id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteamStatus {
    pub running: bool,
    pub online: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritePreset {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoritePresetsReply {
    #[serde(default)]
    pub favorites: Vec<FavoritePreset>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameHistoryReply {
    #[serde(default)]
    pub history: Vec<GameInfo>,
}

/// Favourite games list. Toggling also carries a message such as
/// "Added to favorites".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFavoritesReply {
    #[serde(default)]
    pub favorites: Vec<GameInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Pulls a human-readable message out of an error body, if the backend sent one.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<StatusReply>(body)
        .ok()
        .and_then(|reply| reply.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}
