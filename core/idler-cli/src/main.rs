//! idler: command-line front-end for the game-idling backend.
//!
//! Each invocation builds a fresh `SessionTracker`, so commands that need
//! running state reconcile against the backend before acting.
//!
//! ## Subcommands
//!
//! - `status`, `start`, `stop`, `toggle`, `stop-all`, `emergency-stop`: session control
//! - `add`: look games up and remember them in the backend history
//! - `run-preset`, `stop-preset`, `presets`, `save-preset`, `delete-preset`,
//!   `rename-preset`, `favorites`: stored presets
//! - `history`, `game-favorites`: saved game lists
//! - `session-time`, `steam`: read-only backend queries
//! - `watch`: keeps polling and prints the aggregate timer every second

mod commands;
mod logging;
mod observer;

use clap::{Parser, Subcommand};
use idler_core::{load_config, HttpBackend, SessionTracker, SystemClock, TrackerOptions};
use observer::ConsoleObserver;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "idler")]
#[command(about = "Game-idling session tracker")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $IDLER_CONFIG or ~/.idler/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Show which games are running (defaults to every game in a preset)
    Status {
        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },

    /// Start one or more games
    Start {
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,
    },

    /// Stop one or more games
    Stop {
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,
    },

    /// Stop the games if all are running, otherwise start the rest
    Toggle {
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,
    },

    /// Look games up and add them to the backend history
    Add {
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,
    },

    /// Stop every running game, one at a time
    StopAll {
        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },

    /// Ask the backend to kill every idling process at once
    EmergencyStop,

    /// Start every game in a stored preset
    RunPreset {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Stop the running games of a stored preset
    StopPreset {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List stored presets
    Presets,

    /// Save a preset from a list of game ids
    SavePreset {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,
    },

    /// Delete a stored preset
    DeletePreset {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Rename a stored preset
    RenamePreset {
        #[arg(value_name = "OLD")]
        old_name: String,

        #[arg(value_name = "NEW")]
        new_name: String,
    },

    /// List favourite presets, or change them
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },

    /// List recently added games, or change the history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// List favourite games, or change them
    GameFavorites {
        #[command(subcommand)]
        action: Option<GameFavoriteAction>,
    },

    /// Show current-session and total playtime for a game
    SessionTime {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show Steam client status
    Steam {
        /// Launch Steam before reporting its status
        #[arg(long)]
        launch: bool,
    },

    /// Poll continuously and print the aggregate running time
    Watch {
        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum FavoriteAction {
    /// Mark a preset as favourite
    Add {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Unmark a favourite preset
    Remove {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum HistoryAction {
    /// Drop one game from the history
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Empty the history
    Clear,

    /// Add every game in the history
    AddAll,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum GameFavoriteAction {
    /// Favourite a game, or unfavourite it if it already is one
    Toggle {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Drop one game from the favourites
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Empty the favourites
    Clear,

    /// Add every favourite game
    AddAll,
}

fn main() {
    let logging_guard = logging::init();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            drop(logging_guard);
            std::process::exit(2);
        }
    };
    let backend = match HttpBackend::from_config(&config) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            drop(logging_guard);
            std::process::exit(2);
        }
    };
    tracing::debug!(base_url = %config.base_url, "Using backend");

    let tracker = Arc::new(SessionTracker::with_clock(
        Arc::new(backend),
        Arc::new(ConsoleObserver),
        Arc::new(SystemClock),
        TrackerOptions::from(&config),
    ));
    let output = commands::Output::new(cli.json);

    if let Err(e) = commands::run(cli.command, &tracker, &config, &output) {
        tracing::error!(error = %e, "idler command failed");
        drop(logging_guard);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_requires_at_least_one_id() {
        assert!(Cli::try_parse_from(["idler", "start"]).is_err());
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["idler", "stop-all", "1", "2", "--json"]).unwrap();
        assert!(cli.json);
        assert_eq!(
            cli.command,
            Commands::StopAll {
                ids: vec!["1".to_string(), "2".to_string()]
            }
        );
    }

    #[test]
    fn parses_config_override() {
        let cli =
            Cli::try_parse_from(["idler", "--config", "/tmp/idler.toml", "presets"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/idler.toml")));
        assert_eq!(cli.command, Commands::Presets);
    }

    #[test]
    fn parses_nested_list_actions() {
        let cli = Cli::try_parse_from(["idler", "history", "add-all"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::History {
                action: Some(HistoryAction::AddAll)
            }
        );

        let cli = Cli::try_parse_from(["idler", "game-favorites"]).unwrap();
        assert_eq!(cli.command, Commands::GameFavorites { action: None });

        let cli = Cli::try_parse_from(["idler", "favorites", "remove", "weekend"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Favorites {
                action: Some(FavoriteAction::Remove {
                    name: "weekend".to_string()
                })
            }
        );
    }

    #[test]
    fn save_preset_requires_games() {
        assert!(Cli::try_parse_from(["idler", "save-preset", "weekend"]).is_err());
        let cli = Cli::try_parse_from(["idler", "save-preset", "weekend", "10", "20"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::SavePreset {
                name: "weekend".to_string(),
                ids: vec!["10".to_string(), "20".to_string()]
            }
        );
    }

    #[test]
    fn steam_launch_flag() {
        let cli = Cli::try_parse_from(["idler", "steam", "--launch"]).unwrap();
        assert_eq!(cli.command, Commands::Steam { launch: true });
    }
}
