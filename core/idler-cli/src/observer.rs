use idler_core::{GameId, LogObserver, Notification, SessionObserver};

/// Prints notifications to stderr so stdout only carries command output.
pub struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn state_changed(&self, running: &[GameId]) {
        LogObserver.state_changed(running);
    }

    fn notify(&self, notification: &Notification) {
        eprintln!("[{}] {}", notification.level, notification.message);
    }
}
