//! Blocking HTTP client for the idling backend.

use super::Backend;
use crate::config::IdlerConfig;
use crate::error::{IdlerError, Result};
use idler_protocol::{
    error_message, paths, ClearAllRequest, EmergencyStopReply, FavoritePresetRequest,
    FavoritePresetsReply, GameFavoritesReply, GameHistoryReply, GameId, GameInfo, GameRequest,
    GameStatusReply, Preset, PresetNameRequest, RenamePresetRequest, RunPresetReply,
    SavePresetRequest, SessionTimeReply, StatusReply, SteamStatus,
};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| IdlerError::Transport {
                endpoint: "client setup".to_string(),
                source,
            })?;
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &IdlerConfig) -> Result<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and returns the body of a 2xx answer.
    fn send(&self, path: &str, request: RequestBuilder) -> Result<String> {
        let response = request.send().map_err(|source| IdlerError::Transport {
            endpoint: path.to_string(),
            source,
        })?;
        let status = response.status();
        let body = response.text().map_err(|source| IdlerError::Transport {
            endpoint: path.to_string(),
            source,
        })?;

        if !status.is_success() {
            tracing::debug!(endpoint = path, status = status.as_u16(), "Backend error response");
            return Err(IdlerError::Backend {
                endpoint: path.to_string(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        self.send(path, self.client.post(self.url(path)).json(body))
    }

    fn get(&self, path: &str) -> Result<String> {
        self.send(path, self.client.get(self.url(path)))
    }

    fn delete<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        self.send(path, self.client.delete(self.url(path)).json(body))
    }

    fn require_success(path: &str, reply: StatusReply) -> Result<()> {
        if reply.is_success() {
            Ok(())
        } else {
            Err(IdlerError::Rejected {
                endpoint: path.to_string(),
                message: reply.message,
            })
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| IdlerError::Decode {
        endpoint: path.to_string(),
        source,
    })
}

impl Backend for HttpBackend {
    fn game_status(&self, game_id: &GameId) -> Result<bool> {
        let body = self.post(paths::GAME_STATUS, &GameRequest::new(game_id))?;
        let reply: GameStatusReply = decode(paths::GAME_STATUS, &body)?;
        if !reply.is_success() {
            return Err(IdlerError::Rejected {
                endpoint: paths::GAME_STATUS.to_string(),
                message: reply.message,
            });
        }
        Ok(reply.running)
    }

    fn start_game(&self, game_id: &GameId) -> Result<()> {
        self.post(paths::START_GAME, &GameRequest::new(game_id))
            .map(|_| ())
    }

    fn stop_game(&self, game_id: &GameId) -> Result<()> {
        self.post(paths::STOP_GAME, &GameRequest::new(game_id))
            .map(|_| ())
    }

    fn session_time(&self, game_id: &GameId) -> Result<SessionTimeReply> {
        let body = self.post(paths::SESSION_TIME, &GameRequest::new(game_id))?;
        decode(paths::SESSION_TIME, &body)
    }

    fn emergency_stop(&self) -> Result<Vec<GameId>> {
        let body = self.get(paths::EMERGENCY_STOP)?;
        let reply: EmergencyStopReply = decode(paths::EMERGENCY_STOP, &body)?;
        if !reply.is_success() {
            return Err(IdlerError::Rejected {
                endpoint: paths::EMERGENCY_STOP.to_string(),
                message: reply.message,
            });
        }
        Ok(reply.stopped_games)
    }

    fn run_preset(&self, name: &str) -> Result<Vec<GameId>> {
        let request = PresetNameRequest {
            name: name.to_string(),
        };
        let body = self.post(paths::RUN_PRESET, &request)?;
        let reply: RunPresetReply = decode(paths::RUN_PRESET, &body)?;
        if !reply.is_success() {
            return Err(IdlerError::Rejected {
                endpoint: paths::RUN_PRESET.to_string(),
                message: reply.message,
            });
        }
        Ok(reply.game_ids)
    }

    fn fetch_game(&self, game_id: &GameId) -> Result<GameInfo> {
        let body = self.post(paths::FETCH_GAME, &GameRequest::new(game_id))?;
        decode(paths::FETCH_GAME, &body)
    }

    fn presets(&self) -> Result<Vec<Preset>> {
        let body = self.get(paths::GET_PRESETS)?;
        decode(paths::GET_PRESETS, &body)
    }

    fn save_preset(&self, name: &str, games: &[GameInfo]) -> Result<()> {
        let request = SavePresetRequest {
            name: name.to_string(),
            games: games.to_vec(),
        };
        let body = self.post(paths::SAVE_PRESET, &request)?;
        Self::require_success(paths::SAVE_PRESET, decode(paths::SAVE_PRESET, &body)?)
    }

    fn delete_preset(&self, name: &str) -> Result<()> {
        let request = PresetNameRequest {
            name: name.to_string(),
        };
        let body = self.post(paths::DELETE_PRESET, &request)?;
        Self::require_success(paths::DELETE_PRESET, decode(paths::DELETE_PRESET, &body)?)
    }

    // The list endpoints below answer without a `status` field; 2xx is success.

    fn rename_preset(&self, old_name: &str, new_name: &str) -> Result<()> {
        let request = RenamePresetRequest {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        };
        self.post(paths::RENAME_PRESET, &request).map(|_| ())
    }

    fn favorite_presets(&self) -> Result<Vec<String>> {
        let body = self.get(paths::FAVORITES)?;
        let reply: FavoritePresetsReply = decode(paths::FAVORITES, &body)?;
        Ok(reply.favorites.into_iter().map(|favorite| favorite.name).collect())
    }

    fn add_favorite_preset(&self, name: &str) -> Result<()> {
        let request = FavoritePresetRequest {
            preset_name: name.to_string(),
        };
        self.post(paths::FAVORITES, &request).map(|_| ())
    }

    fn remove_favorite_preset(&self, name: &str) -> Result<()> {
        let request = FavoritePresetRequest {
            preset_name: name.to_string(),
        };
        self.delete(paths::FAVORITES, &request).map(|_| ())
    }

    fn game_history(&self) -> Result<Vec<GameInfo>> {
        let body = self.get(paths::GAME_HISTORY)?;
        decode::<GameHistoryReply>(paths::GAME_HISTORY, &body).map(|reply| reply.history)
    }

    fn record_history(&self, game: &GameInfo) -> Result<Vec<GameInfo>> {
        let body = self.post(paths::GAME_HISTORY, game)?;
        decode::<GameHistoryReply>(paths::GAME_HISTORY, &body).map(|reply| reply.history)
    }

    fn remove_from_history(&self, game_id: &GameId) -> Result<Vec<GameInfo>> {
        let body = self.delete(paths::GAME_HISTORY, &GameRequest::new(game_id))?;
        decode::<GameHistoryReply>(paths::GAME_HISTORY, &body).map(|reply| reply.history)
    }

    fn clear_history(&self) -> Result<()> {
        self.delete(paths::GAME_HISTORY, &ClearAllRequest::new())
            .map(|_| ())
    }

    fn game_favorites(&self) -> Result<Vec<GameInfo>> {
        let body = self.get(paths::GAME_FAVORITES)?;
        decode::<GameFavoritesReply>(paths::GAME_FAVORITES, &body).map(|reply| reply.favorites)
    }

    fn toggle_game_favorite(&self, game: &GameInfo) -> Result<GameFavoritesReply> {
        let body = self.post(paths::GAME_FAVORITES, game)?;
        decode(paths::GAME_FAVORITES, &body)
    }

    fn remove_game_favorite(&self, game_id: &GameId) -> Result<Vec<GameInfo>> {
        let body = self.delete(paths::GAME_FAVORITES, &GameRequest::new(game_id))?;
        decode::<GameFavoritesReply>(paths::GAME_FAVORITES, &body).map(|reply| reply.favorites)
    }

    fn clear_game_favorites(&self) -> Result<()> {
        self.delete(paths::GAME_FAVORITES, &ClearAllRequest::new())
            .map(|_| ())
    }

    fn steam_status(&self) -> Result<SteamStatus> {
        let body = self.get(paths::STEAM_STATUS)?;
        decode(paths::STEAM_STATUS, &body)
    }

    fn launch_steam(&self) -> Result<()> {
        let body = self.get(paths::LAUNCH_STEAM)?;
        Self::require_success(paths::LAUNCH_STEAM, decode(paths::LAUNCH_STEAM, &body)?)
    }
}
