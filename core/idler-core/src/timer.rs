//! Background loops: the reconciliation poller and the aggregate timer.
//!
//! The poller runs for the life of the process. The aggregate timer belongs to
//! whatever view displays it and stops when its guard is dropped, on every
//! exit path.

use crate::session::{AggregateTick, SessionTracker};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Starts the reconciliation loop. There is no way to stop it.
pub fn spawn_poller(tracker: Arc<SessionTracker>, interval: Duration) -> JoinHandle<()> {
    thread::spawn(move || loop {
        thread::sleep(interval);
        tracker.poll_once();
    })
}

/// Scoped handle for the one-second aggregate counter.
///
/// Dropping the guard cancels the timer and joins its thread, so a closed view
/// never keeps receiving ticks.
pub struct AggregateTimer {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AggregateTimer {
    pub fn start<F>(tracker: Arc<SessionTracker>, interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(&AggregateTick) + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match cancelled.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    let tick = tracker.tick();
                    on_tick(&tick);
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    /// Stops the timer now rather than at end of scope.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Aggregate timer thread panicked");
            }
        }
    }
}

impl Drop for AggregateTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
