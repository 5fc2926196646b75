//! Client-side session tracking.
//!
//! `SessionTracker` owns two pieces of state:
//!
//! - the **running set**: games believed to be running, corrected by polling
//!   the backend
//! - the **start-time index**: when this client first saw each running game,
//!   used to extrapolate elapsed time between polls
//!
//! ## Invariant
//!
//! Every key of the start-time index is a member of the running set. Entries
//! are created lazily, so a running game may briefly lack a start time, but a
//! start time never outlives its game's membership.
//!
//! ## Locking
//!
//! All state sits behind one `Mutex`. Backend calls are made with the lock
//! released; each mutation is a complete read-modify-write under the lock, and
//! observers run after it is dropped.

use crate::backend::Backend;
use crate::clock::{Clock, SystemClock};
use crate::config::IdlerConfig;
use crate::duration::{format_hms, parse_hms};
use crate::error::{IdlerError, Result};
use crate::events::{Notification, SessionObserver};
use idler_protocol::{paths, GameId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// State
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    running: HashSet<GameId>,
    start_times: HashMap<GameId, i64>,
    known: BTreeSet<GameId>,
}

impl SessionState {
    pub(crate) fn is_running(&self, game_id: &GameId) -> bool {
        self.running.contains(game_id)
    }

    pub(crate) fn running_sorted(&self) -> Vec<GameId> {
        let mut running: Vec<GameId> = self.running.iter().cloned().collect();
        running.sort();
        running
    }

    /// Adds to the running set; records a start time if none exists.
    /// Returns whether membership changed.
    pub(crate) fn mark_running(&mut self, game_id: &GameId, now: i64) -> bool {
        self.start_times.entry(game_id.clone()).or_insert(now);
        self.running.insert(game_id.clone())
    }

    /// Removes from the running set together with its start time.
    pub(crate) fn mark_stopped(&mut self, game_id: &GameId) -> bool {
        self.start_times.remove(game_id);
        self.running.remove(game_id)
    }

    pub(crate) fn clear(&mut self) -> bool {
        let had_running = !self.running.is_empty();
        self.running.clear();
        self.start_times.clear();
        had_running
    }

    pub(crate) fn track(&mut self, game_id: GameId) {
        self.known.insert(game_id);
    }

    /// Total whole seconds elapsed across running games at `now`.
    ///
    /// Running games without a start time get one at `now`. An empty running
    /// set clears the index entirely.
    pub(crate) fn aggregate_seconds(&mut self, now: i64) -> u64 {
        if self.running.is_empty() {
            self.start_times.clear();
            return 0;
        }

        for game_id in &self.running {
            self.start_times.entry(game_id.clone()).or_insert(now);
        }

        self.start_times
            .iter()
            .filter(|(game_id, _)| self.running.contains(*game_id))
            .map(|(_, started)| (now.saturating_sub(*started).max(0) / 1000) as u64)
            .sum()
    }

    pub(crate) fn invariant_holds(&self) -> bool {
        self.start_times
            .keys()
            .all(|game_id| self.running.contains(game_id))
    }

    fn known_games(&self) -> Vec<GameId> {
        let mut known = self.known.clone();
        known.extend(self.running.iter().cloned());
        known.into_iter().collect()
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            running: self.running_sorted(),
            start_times: self
                .start_times
                .iter()
                .map(|(game_id, started)| (game_id.clone(), *started))
                .collect(),
            known: self.known_games(),
        }
    }
}

/// Point-in-time copy of tracker state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub running: Vec<GameId>,
    pub start_times: BTreeMap<GameId, i64>,
    pub known: Vec<GameId>,
}

/// One evaluation of the aggregate elapsed-time counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateTick {
    pub total_seconds: u64,
    pub display: String,
    pub running: usize,
}

/// Backend-reported playtime for a single game, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Playtime {
    pub current_session: u64,
    pub total: u64,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    pub checked: usize,
    pub changed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct TrackerOptions {
    pub stop_all_delay: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            stop_all_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&IdlerConfig> for TrackerOptions {
    fn from(config: &IdlerConfig) -> Self {
        Self {
            stop_all_delay: config.stop_all_delay(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tracker
// ═══════════════════════════════════════════════════════════════════════════════

pub struct SessionTracker {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) observer: Arc<dyn SessionObserver>,
    clock: Arc<dyn Clock>,
    pub(crate) options: TrackerOptions,
    state: Mutex<SessionState>,
}

impl SessionTracker {
    pub fn new(backend: Arc<dyn Backend>, observer: Arc<dyn SessionObserver>) -> Self {
        Self::with_clock(
            backend,
            observer,
            Arc::new(SystemClock),
            TrackerOptions::default(),
        )
    }

    pub fn with_clock(
        backend: Arc<dyn Backend>,
        observer: Arc<dyn SessionObserver>,
        clock: Arc<dyn Clock>,
        options: TrackerOptions,
    ) -> Self {
        Self {
            backend,
            observer,
            clock,
            options,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies `mutation` under the lock and fires the change signal once if
    /// it reports a membership change.
    pub(crate) fn mutate<F>(&self, mutation: F) -> bool
    where
        F: FnOnce(&mut SessionState, i64) -> bool,
    {
        let now = self.clock.now_millis();
        let (changed, running) = {
            let mut state = self.lock();
            let changed = mutation(&mut state, now);
            debug_assert!(state.invariant_holds());
            let running = if changed {
                state.running_sorted()
            } else {
                Vec::new()
            };
            (changed, running)
        };

        if changed {
            self.observer.state_changed(&running);
        }
        changed
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.observer.notify(&notification);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn is_running(&self, game_id: &GameId) -> bool {
        self.lock().is_running(game_id)
    }

    pub fn running_games(&self) -> Vec<GameId> {
        self.lock().running_sorted()
    }

    /// Games the poll loop checks: tracked games plus anything running.
    pub fn known_games(&self) -> Vec<GameId> {
        self.lock().known_games()
    }

    pub fn track<I>(&self, game_ids: I)
    where
        I: IntoIterator<Item = GameId>,
    {
        let mut state = self.lock();
        for game_id in game_ids {
            if !game_id.is_empty() {
                state.track(game_id);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Start / Stop
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn start(&self, game_id: &GameId) -> Result<()> {
        require_game_id(game_id)?;
        match self.backend.start_game(game_id) {
            Ok(()) => {
                self.mutate(|state, now| {
                    state.track(game_id.clone());
                    state.mark_running(game_id, now)
                });
                tracing::info!(game_id = %game_id, "Game started");
                self.notify(Notification::success(format!(
                    "Game {} started successfully",
                    game_id
                )));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(game_id = %game_id, error = %err, "Failed to start game");
                self.notify(Notification::error(err.user_message("Failed to start game")));
                Err(err)
            }
        }
    }

    pub fn stop(&self, game_id: &GameId) -> Result<()> {
        require_game_id(game_id)?;
        match self.backend.stop_game(game_id) {
            Ok(()) => {
                self.mutate(|state, _| state.mark_stopped(game_id));
                tracing::info!(game_id = %game_id, "Game stopped");
                self.notify(Notification::success(format!(
                    "Game {} stopped successfully",
                    game_id
                )));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(game_id = %game_id, error = %err, "Failed to stop game");
                self.notify(Notification::error(err.user_message("Failed to stop game")));
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Corrects membership of `game_id` from backend truth.
    ///
    /// Returns whether membership changed. Failures leave state untouched and
    /// are only logged; the next poll tick tries again.
    pub fn reconcile(&self, game_id: &GameId) -> Result<bool> {
        require_game_id(game_id)?;
        let running = match self.backend.game_status(game_id) {
            Ok(running) => running,
            Err(err) => {
                tracing::warn!(game_id = %game_id, error = %err, "Failed to check game status");
                return Err(err);
            }
        };

        let changed = self.mutate(|state, now| {
            if running {
                state.mark_running(game_id, now)
            } else {
                state.mark_stopped(game_id)
            }
        });
        if changed {
            tracing::info!(game_id = %game_id, running, "Game state reconciled");
        }
        Ok(changed)
    }

    /// Reconciles every known game once, sequentially.
    pub fn poll_once(&self) -> PollReport {
        let mut report = PollReport::default();
        for game_id in self.known_games() {
            report.checked += 1;
            match self.reconcile(&game_id) {
                Ok(true) => report.changed += 1,
                Ok(false) => {}
                Err(_) => report.failed += 1,
            }
        }
        tracing::debug!(
            checked = report.checked,
            changed = report.changed,
            failed = report.failed,
            "Poll tick"
        );
        report
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Aggregate timer
    // ─────────────────────────────────────────────────────────────────────────────

    /// Evaluates the aggregate elapsed-time counter at the current clock.
    pub fn tick(&self) -> AggregateTick {
        let now = self.clock.now_millis();
        let mut state = self.lock();
        let total_seconds = state.aggregate_seconds(now);
        AggregateTick {
            total_seconds,
            display: format_hms(total_seconds),
            running: state.running.len(),
        }
    }

    /// Authoritative per-game playtime from the backend. Does not feed the
    /// aggregate counter.
    pub fn playtime(&self, game_id: &GameId) -> Result<Playtime> {
        let reply = self.backend.session_time(game_id).map_err(|err| {
            tracing::warn!(game_id = %game_id, error = %err, "Failed to fetch playtime");
            err
        })?;

        let unparseable = |value: &str| IdlerError::Rejected {
            endpoint: paths::SESSION_TIME.to_string(),
            message: Some(format!("unparseable duration {:?}", value)),
        };
        Ok(Playtime {
            current_session: parse_hms(&reply.current_session)
                .ok_or_else(|| unparseable(&reply.current_session))?,
            total: parse_hms(&reply.total_time).ok_or_else(|| unparseable(&reply.total_time))?,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Emergency stop
    // ─────────────────────────────────────────────────────────────────────────────

    /// One backend call stops everything; on success local state is cleared
    /// regardless of what it held.
    pub fn emergency_stop(&self) -> Result<Vec<GameId>> {
        match self.backend.emergency_stop() {
            Ok(stopped) => {
                self.mutate(|state, _| state.clear());
                tracing::info!(stopped = stopped.len(), "Emergency stop completed");
                self.notify(Notification::success(format!(
                    "Emergency stop successful - Stopped {} games",
                    stopped.len()
                )));
                Ok(stopped)
            }
            Err(err) => {
                tracing::error!(error = %err, "Emergency stop failed");
                self.notify(Notification::error(
                    err.user_message("Failed to stop all games"),
                ));
                Err(err)
            }
        }
    }
}

fn require_game_id(game_id: &GameId) -> Result<()> {
    if game_id.is_empty() {
        return Err(IdlerError::InvalidGameId(game_id.to_string()));
    }
    Ok(())
}
