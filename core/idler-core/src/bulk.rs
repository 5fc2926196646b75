//! Multi-game operations built on single start/stop.
//!
//! Batches never abort on an individual failure: every game is attempted once,
//! failures are counted and the caller gets a summary.

use crate::error::{IdlerError, Result};
use crate::events::Notification;
use crate::session::SessionTracker;
use idler_protocol::GameId;
use serde::Serialize;
use std::thread;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: Vec<GameId>,
    pub failed: Vec<GameId>,
    /// Inputs left alone because they were already in the desired state.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<GameId>,
}

impl BatchSummary {
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn level_for(&self, message: String) -> Notification {
        if self.failed.is_empty() {
            Notification::success(message)
        } else if self.succeeded.is_empty() {
            Notification::error(message)
        } else {
            Notification::warning(format!("{} ({} failed)", message, self.failed_count()))
        }
    }

    fn notification(&self, verb: &str) -> Notification {
        self.level_for(format!(
            "{} {} of {} games",
            verb,
            self.succeeded_count(),
            self.attempted
        ))
    }

    fn added_notification(&self) -> Notification {
        let mut message = format!("Added {} games", self.succeeded_count());
        if !self.skipped.is_empty() {
            message.push_str(&format!(" ({} duplicates skipped)", self.skipped.len()));
        }
        self.level_for(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "summary", rename_all = "snake_case")]
pub enum ToggleOutcome {
    Started(BatchSummary),
    Stopped(BatchSummary),
}

impl SessionTracker {
    /// Stops `games` one at a time, continuing past failures.
    pub fn stop_all(&self, games: &[GameId]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let delay = self.options.stop_all_delay;

        for (index, game_id) in games.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            summary.attempted += 1;
            match self.stop(game_id) {
                Ok(()) => summary.succeeded.push(game_id.clone()),
                Err(_) => summary.failed.push(game_id.clone()),
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded_count(),
            failed = summary.failed_count(),
            "Stop-all finished"
        );
        self.notify(summary.notification("Stopped"));
        summary
    }

    /// Stops whatever is currently believed to be running.
    pub fn stop_running(&self) -> BatchSummary {
        let running = self.running_games();
        if running.is_empty() {
            self.notify(Notification::info("No games running to stop"));
            return BatchSummary::default();
        }
        self.stop_all(&running)
    }

    /// Starts each game in `games` that is not already running.
    pub fn start_many(&self, games: &[GameId]) -> Result<BatchSummary> {
        if games.is_empty() {
            self.notify(Notification::error("Please select games first"));
            return Ok(BatchSummary::default());
        }
        self.ensure_steam_ready()?;

        let mut summary = BatchSummary::default();
        for game_id in games {
            if self.is_running(game_id) {
                continue;
            }
            summary.attempted += 1;
            match self.start(game_id) {
                Ok(()) => summary.succeeded.push(game_id.clone()),
                Err(_) => summary.failed.push(game_id.clone()),
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded_count(),
            failed = summary.failed_count(),
            "Start-many finished"
        );
        self.notify(summary.notification("Started"));
        Ok(summary)
    }

    /// Asks the backend to start a stored preset and adopts its games.
    pub fn run_preset(&self, name: &str) -> Result<Vec<GameId>> {
        self.ensure_steam_ready()?;

        match self.backend.run_preset(name) {
            Ok(game_ids) => {
                let game_ids: Vec<GameId> =
                    game_ids.into_iter().filter(|id| !id.is_empty()).collect();
                self.mutate(|state, now| {
                    let mut changed = false;
                    for game_id in &game_ids {
                        state.track(game_id.clone());
                        changed |= state.mark_running(game_id, now);
                    }
                    changed
                });
                tracing::info!(preset = name, games = game_ids.len(), "Preset started");
                let names: Vec<&str> = game_ids.iter().map(GameId::as_str).collect();
                self.notify(Notification::success(format!(
                    "Started games in preset \"{}\": {}",
                    name,
                    names.join(", ")
                )));
                Ok(game_ids)
            }
            Err(err) => {
                tracing::warn!(preset = name, error = %err, "Failed to run preset");
                self.notify(Notification::error(err.user_message("Failed to run preset")));
                Err(err)
            }
        }
    }

    /// Looks up, tracks and records in history each game not already known,
    /// continuing past failed lookups.
    pub fn add_many(&self, games: &[GameId]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        if games.is_empty() {
            self.notify(Notification::info("No games to add"));
            return summary;
        }

        for game_id in games {
            if game_id.is_empty() {
                continue;
            }
            if self.known_games().contains(game_id) {
                summary.skipped.push(game_id.clone());
                continue;
            }
            summary.attempted += 1;
            match self.game_info(game_id) {
                Ok(info) => {
                    self.remember(&info);
                    summary.succeeded.push(game_id.clone());
                }
                Err(_) => summary.failed.push(game_id.clone()),
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded_count(),
            failed = summary.failed_count(),
            skipped = summary.skipped.len(),
            "Add-many finished"
        );
        self.notify(summary.added_notification());
        summary
    }

    /// Re-adds every game from the backend history.
    pub fn add_from_history(&self) -> Result<BatchSummary> {
        let history = self.game_history()?;
        if history.is_empty() {
            self.notify(Notification::info("No games in history to add"));
            return Ok(BatchSummary::default());
        }
        let ids: Vec<GameId> = history.into_iter().map(|game| game.id).collect();
        Ok(self.add_many(&ids))
    }

    /// Re-adds every favourite game.
    pub fn add_from_favorites(&self) -> Result<BatchSummary> {
        let favorites = self.game_favorites()?;
        if favorites.is_empty() {
            self.notify(Notification::info("No favorite games to add"));
            return Ok(BatchSummary::default());
        }
        let ids: Vec<GameId> = favorites.into_iter().map(|game| game.id).collect();
        Ok(self.add_many(&ids))
    }

    /// Stops the running members of a stored preset.
    pub fn stop_preset(&self, name: &str) -> Result<BatchSummary> {
        let presets = self.backend.presets().map_err(|err| {
            tracing::warn!(preset = name, error = %err, "Failed to load presets");
            self.notify(Notification::error("Failed to stop preset"));
            err
        })?;

        let preset = match presets.into_iter().find(|preset| preset.name == name) {
            Some(preset) => preset,
            None => {
                let err = IdlerError::PresetNotFound(name.to_string());
                self.notify(Notification::error(err.user_message("Failed to stop preset")));
                return Err(err);
            }
        };

        let running: Vec<GameId> = preset
            .game_ids()
            .into_iter()
            .filter(|game_id| self.is_running(game_id))
            .collect();
        if running.is_empty() {
            self.notify(Notification::info(format!(
                "No running games found in preset \"{}\"",
                name
            )));
            return Ok(BatchSummary::default());
        }
        Ok(self.stop_all(&running))
    }

    /// Stops every game if all are running, otherwise starts the rest.
    pub fn toggle_all(&self, games: &[GameId]) -> Result<ToggleOutcome> {
        let all_running = !games.is_empty() && games.iter().all(|game_id| self.is_running(game_id));
        if all_running {
            Ok(ToggleOutcome::Stopped(self.stop_all(games)))
        } else {
            self.start_many(games).map(ToggleOutcome::Started)
        }
    }

    /// Refuses bulk starts while Steam is down or offline.
    pub(crate) fn ensure_steam_ready(&self) -> Result<()> {
        let status = self.backend.steam_status().map_err(|err| {
            tracing::warn!(error = %err, "Failed to check Steam status");
            self.notify(Notification::error("Unable to check Steam status"));
            err
        })?;

        let problem = if !status.running {
            Some("Steam is not running. Please start Steam first.")
        } else if !status.online {
            Some("Steam appears to be offline. Please ensure Steam is online.")
        } else {
            None
        };

        if let Some(message) = problem {
            self.notify(Notification::error(message));
            return Err(IdlerError::SteamUnavailable(message.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::Call;
    use crate::events::NotificationLevel;
    use crate::session::test_utils::*;
    use idler_protocol::{GameInfo, Preset};

    fn preset(name: &str, ids: &[&str]) -> Preset {
        Preset {
            name: name.to_string(),
            games: ids
                .iter()
                .map(|raw| GameInfo {
                    id: id(raw),
                    name: format!("Game {}", raw),
                    image: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn stop_all_continues_past_failures() {
        let h = harness();
        for raw in ["g1", "g2", "g3"] {
            h.tracker.start(&id(raw)).expect("start");
        }
        h.backend.fail(Call::Stop, "g2");

        let summary = h.tracker.stop_all(&[id("g1"), id("g2"), id("g3")]);

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, vec![id("g1"), id("g3")]);
        assert_eq!(summary.failed, vec![id("g2")]);
        assert_eq!(h.tracker.running_games(), vec![id("g2")]);
        assert_eq!(h.backend.count(Call::Stop), 3);

        let notification = h.observer.last_notification().unwrap();
        assert_eq!(notification.level, NotificationLevel::Warning);
        assert_eq!(notification.message, "Stopped 2 of 3 games (1 failed)");
    }

    #[test]
    fn stop_all_does_not_retry_failures() {
        let h = harness();
        h.tracker.start(&id("g1")).expect("start");
        h.backend.fail(Call::Stop, "g1");

        let summary = h.tracker.stop_all(&[id("g1")]);

        assert_eq!(summary.failed_count(), 1);
        assert_eq!(h.backend.count(Call::Stop), 1);
        assert_eq!(
            h.observer.last_notification().unwrap().level,
            NotificationLevel::Error
        );
    }

    #[test]
    fn stop_running_with_nothing_running_is_a_no_op() {
        let h = harness();
        let summary = h.tracker.stop_running();
        assert_eq!(summary, BatchSummary::default());
        assert_eq!(h.backend.count(Call::Stop), 0);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "No games running to stop"
        );
    }

    #[test]
    fn start_many_skips_running_games_and_counts_failures() {
        let h = harness();
        h.tracker.start(&id("a")).expect("start");
        h.backend.fail(Call::Start, "c");

        let summary = h
            .tracker
            .start_many(&[id("a"), id("b"), id("c")])
            .expect("start many");

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, vec![id("b")]);
        assert_eq!(summary.failed, vec![id("c")]);
        assert_eq!(h.tracker.running_games(), vec![id("a"), id("b")]);
    }

    #[test]
    fn start_many_aborts_when_steam_is_offline() {
        let h = harness();
        h.backend.set_steam(true, false);

        let err = h.tracker.start_many(&[id("a")]).unwrap_err();

        assert!(matches!(err, IdlerError::SteamUnavailable(_)));
        assert_eq!(h.backend.count(Call::Start), 0);
        assert!(h.tracker.running_games().is_empty());
    }

    #[test]
    fn run_preset_adopts_returned_games() {
        let h = harness();
        h.backend
            .presets
            .lock()
            .unwrap()
            .push(preset("weekend", &["10", "20"]));

        let ids = h.tracker.run_preset("weekend").expect("run preset");

        assert_eq!(ids, vec![id("10"), id("20")]);
        assert_eq!(h.tracker.running_games(), vec![id("10"), id("20")]);
        assert_eq!(h.tracker.known_games(), vec![id("10"), id("20")]);
        assert_eq!(h.observer.change_count(), 1);
    }

    #[test]
    fn run_preset_drops_blank_ids() {
        let h = harness();
        h.backend
            .presets
            .lock()
            .unwrap()
            .push(preset("p", &["  ", "10"]));

        let ids = h.tracker.run_preset("p").expect("run preset");

        assert_eq!(ids, vec![id("10")]);
        assert_eq!(h.tracker.running_games(), vec![id("10")]);
        assert_eq!(h.tracker.known_games(), vec![id("10")]);

        let summary = h.tracker.stop_running();
        assert!(summary.is_complete());
        assert!(h.tracker.running_games().is_empty());
    }

    #[test]
    fn add_many_counts_failures_and_duplicates() {
        let h = harness();
        h.backend.fail(Call::FetchGame, "2");

        let summary = h.tracker.add_many(&[id("1"), id("2"), id("1")]);

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, vec![id("1")]);
        assert_eq!(summary.failed, vec![id("2")]);
        assert_eq!(summary.skipped, vec![id("1")]);
        assert_eq!(h.tracker.known_games(), vec![id("1")]);
        assert_eq!(h.backend.count(Call::FetchGame), 2);
        assert_eq!(h.backend.count(Call::RecordHistory), 1);

        let notification = h.observer.last_notification().unwrap();
        assert_eq!(notification.level, NotificationLevel::Warning);
        assert_eq!(
            notification.message,
            "Added 1 games (1 duplicates skipped) (1 failed)"
        );
    }

    #[test]
    fn add_many_skips_games_already_known() {
        let h = harness();
        h.tracker.track([id("1")]);

        let summary = h.tracker.add_many(&[id("1"), id("2")]);

        assert_eq!(summary.succeeded, vec![id("2")]);
        assert_eq!(summary.skipped, vec![id("1")]);
        assert_eq!(h.backend.count(Call::FetchGame), 1);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Added 1 games (1 duplicates skipped)"
        );
    }

    #[test]
    fn add_from_history_with_empty_history_is_a_no_op() {
        let h = harness();

        let summary = h.tracker.add_from_history().expect("history");

        assert_eq!(summary, BatchSummary::default());
        assert_eq!(h.backend.count(Call::FetchGame), 0);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "No games in history to add"
        );
    }

    #[test]
    fn add_from_favorites_tracks_each_favourite() {
        let h = harness();
        h.backend.game_favorites.lock().unwrap().extend([
            GameInfo {
                id: id("5"),
                name: "Five".to_string(),
                image: String::new(),
            },
            GameInfo {
                id: id("6"),
                name: "Six".to_string(),
                image: String::new(),
            },
        ]);

        let summary = h.tracker.add_from_favorites().expect("favourites");

        assert!(summary.is_complete());
        assert_eq!(h.tracker.known_games(), vec![id("5"), id("6")]);
    }

    #[test]
    fn run_preset_failure_leaves_state_unchanged() {
        let h = harness();
        let err = h.tracker.run_preset("missing").unwrap_err();

        assert_eq!(err.backend_message(), Some("Preset not found"));
        assert!(h.tracker.running_games().is_empty());
        assert_eq!(h.observer.change_count(), 0);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Preset not found"
        );
    }

    #[test]
    fn run_preset_requires_steam() {
        let h = harness();
        h.backend.set_steam(false, false);
        h.backend
            .presets
            .lock()
            .unwrap()
            .push(preset("weekend", &["10"]));

        assert!(h.tracker.run_preset("weekend").is_err());
        assert_eq!(h.backend.count(Call::RunPreset), 0);
        assert_eq!(
            h.observer.last_notification().unwrap().message,
            "Steam is not running. Please start Steam first."
        );
    }

    #[test]
    fn stop_preset_stops_only_running_members() {
        let h = harness();
        h.backend
            .presets
            .lock()
            .unwrap()
            .push(preset("weekend", &["1", "2", "3"]));
        h.tracker.start(&id("1")).expect("start");
        h.tracker.start(&id("3")).expect("start");
        h.tracker.start(&id("9")).expect("start");

        let summary = h.tracker.stop_preset("weekend").expect("stop preset");

        assert_eq!(summary.succeeded, vec![id("1"), id("3")]);
        assert_eq!(h.tracker.running_games(), vec![id("9")]);
    }

    #[test]
    fn stop_preset_unknown_name_fails() {
        let h = harness();
        let err = h.tracker.stop_preset("nope").unwrap_err();
        assert!(matches!(err, IdlerError::PresetNotFound(_)));
    }

    #[test]
    fn toggle_all_starts_then_stops() {
        let h = harness();
        let games = [id("1"), id("2")];
        h.tracker.start(&id("1")).expect("start");

        match h.tracker.toggle_all(&games).expect("toggle") {
            ToggleOutcome::Started(summary) => assert_eq!(summary.succeeded, vec![id("2")]),
            other => panic!("expected start, got {:?}", other),
        }
        match h.tracker.toggle_all(&games).expect("toggle") {
            ToggleOutcome::Stopped(summary) => assert_eq!(summary.succeeded_count(), 2),
            other => panic!("expected stop, got {:?}", other),
        }
        assert!(h.tracker.running_games().is_empty());
    }
}
