//! Backend seam for the idling service.
//!
//! The tracker talks to the backend only through [`Backend`]; `HttpBackend` is
//! the production implementation and tests substitute a scripted one.

mod http;

pub use http::HttpBackend;

use crate::error::Result;
use idler_protocol::{GameFavoritesReply, GameId, GameInfo, Preset, SessionTimeReply, SteamStatus};

/// Operations the idling backend exposes.
///
/// Implementors should:
/// - Treat any non-2xx answer as `IdlerError::Backend`, carrying the
///   backend's message when it sent one
/// - Treat a 2xx answer whose `status` is not `"success"` as
///   `IdlerError::Rejected` on endpoints that report one
/// - Never retry; the caller decides what a failure means
pub trait Backend: Send + Sync {
    /// Whether the backend currently has an idler running for `game_id`.
    fn game_status(&self, game_id: &GameId) -> Result<bool>;

    fn start_game(&self, game_id: &GameId) -> Result<()>;

    fn stop_game(&self, game_id: &GameId) -> Result<()>;

    fn session_time(&self, game_id: &GameId) -> Result<SessionTimeReply>;

    /// Stops everything in one call; returns the ids the backend stopped.
    fn emergency_stop(&self) -> Result<Vec<GameId>>;

    /// Starts every game in a stored preset; returns the preset's ids.
    fn run_preset(&self, name: &str) -> Result<Vec<GameId>>;

    fn fetch_game(&self, game_id: &GameId) -> Result<GameInfo>;

    fn presets(&self) -> Result<Vec<Preset>>;

    fn save_preset(&self, name: &str, games: &[GameInfo]) -> Result<()>;

    fn delete_preset(&self, name: &str) -> Result<()>;

    fn rename_preset(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Names of the presets marked as favourites.
    fn favorite_presets(&self) -> Result<Vec<String>>;

    fn add_favorite_preset(&self, name: &str) -> Result<()>;

    fn remove_favorite_preset(&self, name: &str) -> Result<()>;

    fn game_history(&self) -> Result<Vec<GameInfo>>;

    /// Appends to the history; returns the updated list.
    fn record_history(&self, game: &GameInfo) -> Result<Vec<GameInfo>>;

    fn remove_from_history(&self, game_id: &GameId) -> Result<Vec<GameInfo>>;

    fn clear_history(&self) -> Result<()>;

    fn game_favorites(&self) -> Result<Vec<GameInfo>>;

    /// Adds `game` to the favourites, or removes it if already there.
    fn toggle_game_favorite(&self, game: &GameInfo) -> Result<GameFavoritesReply>;

    fn remove_game_favorite(&self, game_id: &GameId) -> Result<Vec<GameInfo>>;

    fn clear_game_favorites(&self) -> Result<()>;

    fn steam_status(&self) -> Result<SteamStatus>;

    fn launch_steam(&self) -> Result<()>;
}
