//! Game, preset, favourite and history catalogue calls.
//!
//! Thin pass-throughs to the backend. The only tracker state they touch is the
//! known-games list, so the poll loop picks up games the user has looked at.

use crate::error::{IdlerError, Result};
use crate::events::Notification;
use crate::session::SessionTracker;
use idler_protocol::{GameId, GameInfo, Preset, SteamStatus};

impl SessionTracker {
    /// Looks a game up without touching tracker state.
    pub fn game_info(&self, game_id: &GameId) -> Result<GameInfo> {
        self.backend.fetch_game(game_id).map_err(|err| {
            tracing::warn!(game_id = %game_id, error = %err, "Failed to fetch game");
            err
        })
    }

    /// Looks a game up, adds it to the polled list and records it in the
    /// backend history.
    pub fn add_game(&self, game_id: &GameId) -> Result<GameInfo> {
        let info = match self.game_info(game_id) {
            Ok(info) => info,
            Err(err) => {
                self.notify(Notification::error(err.user_message("Error fetching game")));
                return Err(err);
            }
        };
        if !self.remember(&info) {
            self.notify(Notification::error("Failed to update history"));
        }
        Ok(info)
    }

    /// Tracks an already fetched game and records it in the backend history.
    /// Returns whether the history write succeeded; the game stays tracked
    /// either way.
    pub(crate) fn remember(&self, info: &GameInfo) -> bool {
        self.track([info.id.clone()]);
        match self.backend.record_history(info) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(game_id = %info.id, error = %err, "Failed to update history");
                false
            }
        }
    }

    pub fn presets(&self) -> Result<Vec<Preset>> {
        self.backend.presets().map_err(|err| {
            tracing::warn!(error = %err, "Failed to load presets");
            err
        })
    }

    /// Saves a preset and starts polling its games.
    pub fn save_preset(&self, name: &str, games: &[GameInfo]) -> Result<()> {
        let name = name.trim();
        match self.backend.save_preset(name, games) {
            Ok(()) => {
                self.track(games.iter().map(|game| game.id.clone()));
                self.notify(Notification::success(format!("Preset \"{}\" saved", name)));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(preset = name, error = %err, "Failed to save preset");
                self.notify(Notification::error(err.user_message("Failed to save preset")));
                Err(err)
            }
        }
    }

    pub fn delete_preset(&self, name: &str) -> Result<()> {
        match self.backend.delete_preset(name) {
            Ok(()) => {
                self.notify(Notification::success(format!(
                    "Preset \"{}\" deleted",
                    name
                )));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(preset = name, error = %err, "Failed to delete preset");
                self.notify(Notification::error(
                    err.user_message("Failed to delete preset"),
                ));
                Err(err)
            }
        }
    }

    pub fn rename_preset(&self, old_name: &str, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            self.notify(Notification::error("Please enter a new name"));
            return Err(IdlerError::EmptyPresetName);
        }
        match self.backend.rename_preset(old_name, new_name) {
            Ok(()) => {
                tracing::info!(from = old_name, to = new_name, "Preset renamed");
                self.notify(Notification::success(format!(
                    "Preset renamed to \"{}\"",
                    new_name
                )));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(preset = old_name, error = %err, "Failed to rename preset");
                self.notify(Notification::error(
                    err.user_message("Failed to rename preset"),
                ));
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Favourite presets
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn favorite_presets(&self) -> Result<Vec<String>> {
        self.backend.favorite_presets().map_err(|err| {
            tracing::warn!(error = %err, "Failed to load favourite presets");
            err
        })
    }

    pub fn add_favorite_preset(&self, name: &str) -> Result<()> {
        match self.backend.add_favorite_preset(name) {
            Ok(()) => {
                self.notify(Notification::success(format!("Added {} to favorites", name)));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(preset = name, error = %err, "Failed to add favourite");
                self.notify(Notification::error("Failed to add favorite"));
                Err(err)
            }
        }
    }

    pub fn remove_favorite_preset(&self, name: &str) -> Result<()> {
        match self.backend.remove_favorite_preset(name) {
            Ok(()) => {
                self.notify(Notification::success(format!(
                    "Removed {} from favorites",
                    name
                )));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(preset = name, error = %err, "Failed to remove favourite");
                self.notify(Notification::error("Failed to remove favorite"));
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Game history and favourite games
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn game_history(&self) -> Result<Vec<GameInfo>> {
        self.backend.game_history().map_err(|err| {
            tracing::warn!(error = %err, "Failed to load game history");
            err
        })
    }

    pub fn remove_from_history(&self, game_id: &GameId) -> Result<Vec<GameInfo>> {
        match self.backend.remove_from_history(game_id) {
            Ok(history) => {
                self.notify(Notification::success("Game removed from history"));
                Ok(history)
            }
            Err(err) => {
                tracing::warn!(game_id = %game_id, error = %err, "Failed to remove from history");
                self.notify(Notification::error("Failed to remove from history"));
                Err(err)
            }
        }
    }

    pub fn clear_history(&self) -> Result<()> {
        match self.backend.clear_history() {
            Ok(()) => {
                self.notify(Notification::success("Game history cleared successfully"));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to clear history");
                self.notify(Notification::error("Failed to clear history"));
                Err(err)
            }
        }
    }

    pub fn game_favorites(&self) -> Result<Vec<GameInfo>> {
        self.backend.game_favorites().map_err(|err| {
            tracing::warn!(error = %err, "Failed to load favourite games");
            err
        })
    }

    /// Flips `game`'s favourite flag; returns the updated favourites.
    pub fn toggle_game_favorite(&self, game: &GameInfo) -> Result<Vec<GameInfo>> {
        match self.backend.toggle_game_favorite(game) {
            Ok(reply) => {
                let message = reply
                    .message
                    .unwrap_or_else(|| "Favorites updated".to_string());
                self.notify(Notification::success(message));
                Ok(reply.favorites)
            }
            Err(err) => {
                tracing::warn!(game_id = %game.id, error = %err, "Failed to toggle favourite");
                self.notify(Notification::error("Failed to update favorites"));
                Err(err)
            }
        }
    }

    pub fn remove_game_favorite(&self, game_id: &GameId) -> Result<Vec<GameInfo>> {
        match self.backend.remove_game_favorite(game_id) {
            Ok(favorites) => {
                self.notify(Notification::success("Game removed from favorites"));
                Ok(favorites)
            }
            Err(err) => {
                tracing::warn!(game_id = %game_id, error = %err, "Failed to remove favourite game");
                self.notify(Notification::error("Failed to remove from favorites"));
                Err(err)
            }
        }
    }

    pub fn clear_game_favorites(&self) -> Result<()> {
        match self.backend.clear_game_favorites() {
            Ok(()) => {
                self.notify(Notification::success(
                    "Favorite games cleared successfully",
                ));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to clear favourite games");
                self.notify(Notification::error("Failed to clear favorites"));
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Steam
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn steam_status(&self) -> Result<SteamStatus> {
        self.backend.steam_status()
    }

    pub fn launch_steam(&self) -> Result<()> {
        match self.backend.launch_steam() {
            Ok(()) => {
                self.notify(Notification::success("Steam launch initiated"));
                Ok(())
            }
            Err(err) => {
                self.notify(Notification::error(
                    err.user_message("Failed to launch Steam"),
                ));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::test_utils::Call;
    use crate::error::IdlerError;
    use crate::session::test_utils::*;
    use idler_protocol::GameInfo;

    fn info(raw: &str) -> GameInfo {
        GameInfo {
            id: id(raw),
            name: format!("Game {}", raw),
            image: String::new(),
        }
    }

    #[test]
    fn add_game_tracks_it_for_polling() {
        let h = harness();
        let info = h.tracker.add_game(&id("730")).expect("fetch");

        assert_eq!(info.name, "Game 730");
        assert_eq!(h.tracker.known_games(), vec![id("730")]);
        assert!(h.tracker.running_games().is_empty());
    }

    #[test]
    fn add_game_records_history() {
        let h = harness();
        h.tracker.add_game(&id("730")).expect("fetch");
        h.tracker.add_game(&id("440")).expect("fetch");

        let history = h.tracker.game_history().expect("history");
        let ids: Vec<_> = history.into_iter().map(|game| game.id).collect();
        assert_eq!(ids, vec![id("730"), id("440")]);
    }

    #[test]
    fn add_game_survives_history_failure() {
        let h = harness();
        h.backend.fail(Call::RecordHistory, "730");

        h.tracker.add_game(&id("730")).expect("fetch");

        assert_eq!(h.tracker.known_games(), vec![id("730")]);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Failed to update history"
        );
    }

    #[test]
    fn add_game_failure_tracks_nothing() {
        let h = harness();
        h.backend.fail(Call::FetchGame, "730");

        assert!(h.tracker.add_game(&id("730")).is_err());
        assert!(h.tracker.known_games().is_empty());
    }

    #[test]
    fn save_then_delete_preset() {
        let h = harness();
        let games = vec![GameInfo {
            id: id("10"),
            name: "Ten".to_string(),
            image: String::new(),
        }];

        h.tracker.save_preset(" evening ", &games).expect("save");
        let presets = h.tracker.presets().expect("presets");
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].name, "evening");
        assert_eq!(h.tracker.known_games(), vec![id("10")]);

        h.tracker.delete_preset("evening").expect("delete");
        assert!(h.tracker.presets().expect("presets").is_empty());
    }

    #[test]
    fn rename_preset_trims_and_reports() {
        let h = harness();
        h.tracker.save_preset("old", &[]).expect("save");

        h.tracker.rename_preset("old", "  new ").expect("rename");

        let names: Vec<_> = h
            .tracker
            .presets()
            .expect("presets")
            .into_iter()
            .map(|preset| preset.name)
            .collect();
        assert_eq!(names, vec!["new".to_string()]);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Preset renamed to \"new\""
        );
    }

    #[test]
    fn rename_preset_rejects_blank_name_without_calling_backend() {
        let h = harness();
        let err = h.tracker.rename_preset("old", "   ").unwrap_err();

        assert!(matches!(err, IdlerError::EmptyPresetName));
        assert_eq!(h.backend.count(Call::RenamePreset), 0);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Please enter a new name"
        );
    }

    #[test]
    fn rename_preset_surfaces_backend_message() {
        let h = harness();
        h.tracker.save_preset("a", &[]).expect("save");
        h.tracker.save_preset("b", &[]).expect("save");

        assert!(h.tracker.rename_preset("a", "b").is_err());
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "A preset with that name already exists"
        );
    }

    #[test]
    fn favorite_presets_add_and_remove() {
        let h = harness();
        h.tracker.add_favorite_preset("weekend").expect("add");
        h.tracker.add_favorite_preset("weekend").expect("add again");
        assert_eq!(
            h.tracker.favorite_presets().expect("favourites"),
            vec!["weekend".to_string()]
        );
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Added weekend to favorites"
        );

        h.tracker.remove_favorite_preset("weekend").expect("remove");
        assert!(h.tracker.favorite_presets().expect("favourites").is_empty());
    }

    #[test]
    fn history_remove_and_clear() {
        let h = harness();
        for raw in ["1", "2", "3"] {
            h.tracker.add_game(&id(raw)).expect("add");
        }

        let remaining = h.tracker.remove_from_history(&id("2")).expect("remove");
        assert_eq!(remaining.len(), 2);

        h.tracker.clear_history().expect("clear");
        assert!(h.tracker.game_history().expect("history").is_empty());
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Game history cleared successfully"
        );
    }

    #[test]
    fn toggle_game_favorite_flips_membership() {
        let h = harness();
        let game = info("730");

        let favorites = h.tracker.toggle_game_favorite(&game).expect("toggle");
        assert_eq!(favorites, vec![game.clone()]);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Added to favorites"
        );

        assert!(h.tracker.toggle_game_favorite(&game).expect("toggle").is_empty());
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Removed from favorites"
        );
    }

    #[test]
    fn game_favorites_remove_and_clear() {
        let h = harness();
        h.tracker.toggle_game_favorite(&info("1")).expect("toggle");
        h.tracker.toggle_game_favorite(&info("2")).expect("toggle");

        let remaining = h.tracker.remove_game_favorite(&id("1")).expect("remove");
        assert_eq!(remaining, vec![info("2")]);

        h.backend.fail(Call::ClearGameFavorites, "");
        assert!(h.tracker.clear_game_favorites().is_err());
        assert_eq!(h.tracker.game_favorites().expect("favourites").len(), 1);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Failed to clear favorites"
        );
    }

    #[test]
    fn launch_steam_reports_failure_message() {
        let h = harness();
        h.backend.fail(Call::LaunchSteam, "");

        assert!(h.tracker.launch_steam().is_err());
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "scripted failure for "
        );
    }
}
