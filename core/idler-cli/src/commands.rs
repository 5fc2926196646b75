//! Subcommand execution.

use crate::{Commands, FavoriteAction, GameFavoriteAction, HistoryAction};
use idler_core::{
    format_hms, spawn_poller, AggregateTimer, BatchSummary, GameId, GameInfo, IdlerConfig,
    IdlerError, Preset, SessionTracker, ToggleOutcome,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Idler(#[from] IdlerError),

    #[error("{failed} of {attempted} games failed")]
    Partial { attempted: usize, failed: usize },

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Renders command results as text or JSON on stdout.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit<T, F>(&self, value: &T, text: F) -> Result<(), CliError>
    where
        T: Serialize,
        F: FnOnce() -> String,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            let rendered = text();
            if !rendered.is_empty() {
                println!("{}", rendered);
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusView {
    known: Vec<GameStatusLine>,
    running: usize,
    failed_checks: usize,
}

#[derive(Serialize)]
struct GameStatusLine {
    id: GameId,
    running: bool,
}

#[derive(Serialize)]
struct PlaytimeView {
    game_id: GameId,
    current_session: String,
    total: String,
}

pub fn run(
    command: Commands,
    tracker: &Arc<SessionTracker>,
    config: &IdlerConfig,
    out: &Output,
) -> Result<(), CliError> {
    match command {
        Commands::Status { ids } => {
            load_known(tracker, &ids)?;
            let report = tracker.poll_once();
            let view = StatusView {
                known: tracker
                    .known_games()
                    .into_iter()
                    .map(|id| GameStatusLine {
                        running: tracker.is_running(&id),
                        id,
                    })
                    .collect(),
                running: tracker.running_games().len(),
                failed_checks: report.failed,
            };
            out.emit(&view, || render_status(&view))
        }
        Commands::Start { ids } => {
            let games = to_ids(&ids);
            tracker.track(games.iter().cloned());
            tracker.poll_once();
            let summary = tracker.start_many(&games)?;
            out.emit(&summary, || render_summary("Started", &summary))?;
            check_summary(&summary)
        }
        Commands::Stop { ids } => {
            let summary = tracker.stop_all(&to_ids(&ids));
            out.emit(&summary, || render_summary("Stopped", &summary))?;
            check_summary(&summary)
        }
        Commands::Toggle { ids } => {
            let games = to_ids(&ids);
            tracker.track(games.iter().cloned());
            tracker.poll_once();
            let outcome = tracker.toggle_all(&games)?;
            let (verb, summary) = match &outcome {
                ToggleOutcome::Started(summary) => ("Started", summary),
                ToggleOutcome::Stopped(summary) => ("Stopped", summary),
            };
            out.emit(&outcome, || render_summary(verb, summary))?;
            check_summary(summary)
        }
        Commands::Add { ids } => {
            let summary = tracker.add_many(&to_ids(&ids));
            out.emit(&summary, || render_summary("Added", &summary))?;
            check_summary(&summary)
        }
        Commands::StopAll { ids } => {
            load_known(tracker, &ids)?;
            tracker.poll_once();
            let summary = tracker.stop_running();
            out.emit(&summary, || render_summary("Stopped", &summary))?;
            check_summary(&summary)
        }
        Commands::EmergencyStop => {
            let stopped = tracker.emergency_stop()?;
            out.emit(&stopped, || join_ids(&stopped))
        }
        Commands::RunPreset { name } => {
            let started = tracker.run_preset(&name)?;
            out.emit(&started, || join_ids(&started))
        }
        Commands::StopPreset { name } => {
            load_known(tracker, &[])?;
            tracker.poll_once();
            let summary = tracker.stop_preset(&name)?;
            out.emit(&summary, || render_summary("Stopped", &summary))?;
            check_summary(&summary)
        }
        Commands::Presets => {
            let presets = tracker.presets()?;
            out.emit(&presets, || render_presets(&presets))
        }
        Commands::SavePreset { name, ids } => {
            let games = to_ids(&ids)
                .iter()
                .map(|game_id| tracker.game_info(game_id))
                .collect::<Result<Vec<GameInfo>, IdlerError>>()?;
            tracker.save_preset(&name, &games)?;
            out.emit(&games, || render_games(&games))
        }
        Commands::DeletePreset { name } => {
            tracker.delete_preset(&name)?;
            let presets = tracker.presets()?;
            out.emit(&presets, || render_presets(&presets))
        }
        Commands::RenamePreset { old_name, new_name } => {
            tracker.rename_preset(&old_name, &new_name)?;
            let presets = tracker.presets()?;
            out.emit(&presets, || render_presets(&presets))
        }
        Commands::Favorites { action } => {
            match action {
                Some(FavoriteAction::Add { name }) => tracker.add_favorite_preset(&name)?,
                Some(FavoriteAction::Remove { name }) => tracker.remove_favorite_preset(&name)?,
                None => {}
            }
            let favorites = tracker.favorite_presets()?;
            out.emit(&favorites, || favorites.join("\n"))
        }
        Commands::History { action } => {
            let history = match action {
                None => tracker.game_history()?,
                Some(HistoryAction::Remove { id }) => {
                    tracker.remove_from_history(&GameId::new(id))?
                }
                Some(HistoryAction::Clear) => {
                    tracker.clear_history()?;
                    Vec::new()
                }
                Some(HistoryAction::AddAll) => {
                    let summary = tracker.add_from_history()?;
                    out.emit(&summary, || render_summary("Added", &summary))?;
                    return check_summary(&summary);
                }
            };
            out.emit(&history, || render_games(&history))
        }
        Commands::GameFavorites { action } => {
            let favorites = match action {
                None => tracker.game_favorites()?,
                Some(GameFavoriteAction::Toggle { id }) => {
                    let game = tracker.game_info(&GameId::new(id))?;
                    tracker.toggle_game_favorite(&game)?
                }
                Some(GameFavoriteAction::Remove { id }) => {
                    tracker.remove_game_favorite(&GameId::new(id))?
                }
                Some(GameFavoriteAction::Clear) => {
                    tracker.clear_game_favorites()?;
                    Vec::new()
                }
                Some(GameFavoriteAction::AddAll) => {
                    let summary = tracker.add_from_favorites()?;
                    out.emit(&summary, || render_summary("Added", &summary))?;
                    return check_summary(&summary);
                }
            };
            out.emit(&favorites, || render_games(&favorites))
        }
        Commands::SessionTime { id } => {
            let game_id = GameId::new(id);
            let playtime = tracker.playtime(&game_id)?;
            let view = PlaytimeView {
                game_id,
                current_session: format_hms(playtime.current_session),
                total: format_hms(playtime.total),
            };
            out.emit(&view, || {
                format!(
                    "Current session: {}\nTotal: {}",
                    view.current_session, view.total
                )
            })
        }
        Commands::Steam { launch } => {
            if launch {
                tracker.launch_steam()?;
            }
            let status = tracker.steam_status()?;
            out.emit(&status, || status.message.clone())
        }
        Commands::Watch { ids } => watch(tracker, config, out, &ids),
    }
}

fn watch(
    tracker: &Arc<SessionTracker>,
    config: &IdlerConfig,
    out: &Output,
    ids: &[String],
) -> Result<(), CliError> {
    load_known(tracker, ids)?;
    tracker.poll_once();

    let poller = spawn_poller(Arc::clone(tracker), config.poll_interval());
    let json = out.json;
    let _timer = AggregateTimer::start(Arc::clone(tracker), config.timer_interval(), move |tick| {
        if json {
            match serde_json::to_string(tick) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "Failed to encode tick"),
            }
        } else {
            println!("Total: {} ({} running)", tick.display, tick.running);
        }
    });

    // The poller never returns; this blocks until the process is interrupted.
    if poller.join().is_err() {
        tracing::error!("Poller thread panicked");
    }
    Ok(())
}

/// Seeds the tracker with `ids`, or with every preset member when none are given.
fn load_known(tracker: &SessionTracker, ids: &[String]) -> Result<(), CliError> {
    if !ids.is_empty() {
        tracker.track(to_ids(ids));
        return Ok(());
    }
    let presets = tracker.presets()?;
    tracker.track(preset_members(&presets));
    Ok(())
}

fn preset_members(presets: &[Preset]) -> Vec<GameId> {
    presets.iter().flat_map(Preset::game_ids).collect()
}

fn to_ids(raw: &[String]) -> Vec<GameId> {
    raw.iter()
        .map(|id| GameId::new(id.as_str()))
        .filter(|id| !id.is_empty())
        .collect()
}

fn check_summary(summary: &BatchSummary) -> Result<(), CliError> {
    if summary.is_complete() {
        Ok(())
    } else {
        Err(CliError::Partial {
            attempted: summary.attempted,
            failed: summary.failed_count(),
        })
    }
}

fn join_ids(ids: &[GameId]) -> String {
    ids.iter().map(GameId::as_str).collect::<Vec<_>>().join(", ")
}

fn render_summary(verb: &str, summary: &BatchSummary) -> String {
    let mut text = format!(
        "{} {} of {} games",
        verb,
        summary.succeeded_count(),
        summary.attempted
    );
    if !summary.failed.is_empty() {
        text.push_str(&format!("\nFailed: {}", join_ids(&summary.failed)));
    }
    if !summary.skipped.is_empty() {
        text.push_str(&format!("\nSkipped: {}", join_ids(&summary.skipped)));
    }
    text
}

fn render_games(games: &[GameInfo]) -> String {
    games
        .iter()
        .map(|game| format!("{}\t{}", game.id, game.name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_status(view: &StatusView) -> String {
    let mut lines: Vec<String> = view
        .known
        .iter()
        .map(|game| {
            let state = if game.running { "running" } else { "stopped" };
            format!("{}\t{}", game.id, state)
        })
        .collect();
    lines.push(format!("{} running", view.running));
    if view.failed_checks > 0 {
        lines.push(format!("{} status checks failed", view.failed_checks));
    }
    lines.join("\n")
}

fn render_presets(presets: &[Preset]) -> String {
    presets
        .iter()
        .map(|preset| format!("{}: {}", preset.name, join_ids(&preset.game_ids())))
        .collect::<Vec<_>>()
        .join("\n")
}
