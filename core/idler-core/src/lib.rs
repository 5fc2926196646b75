//! # idler-core
//!
//! Client-side session tracking for the game-idling backend, shared by every
//! front-end.
//!
//! ## Design Principles
//!
//! - **Synchronous**: Blocking HTTP, `std::thread` loops. No async runtime.
//! - **Backend is the authority**: Local state is a cache that the poll loop
//!   corrects; nothing here is persisted.
//! - **Graceful degradation**: Failed calls leave state stale but consistent
//!   and surface as notifications, never panics.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use idler_core::{load_config, HttpBackend, LogObserver, SessionTracker};
//! use std::sync::Arc;
//!
//! let config = load_config(None)?;
//! let backend = Arc::new(HttpBackend::from_config(&config)?);
//! let tracker = SessionTracker::new(backend, Arc::new(LogObserver));
//! tracker.start(&"730".into())?;
//! ```

pub mod backend;
pub mod bulk;
mod catalog;
pub mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod events;
pub mod session;
pub mod timer;

pub use backend::{Backend, HttpBackend};
pub use bulk::{BatchSummary, ToggleOutcome};
pub use clock::{Clock, SystemClock};
pub use config::{load_config, IdlerConfig};
pub use duration::{format_hms, parse_hms};
pub use error::{IdlerError, Result};
pub use events::{LogObserver, Notification, NotificationLevel, SessionObserver};
pub use idler_protocol::{GameId, GameInfo, Preset, SteamStatus};
pub use session::{
    AggregateTick, PollReport, Playtime, SessionSnapshot, SessionTracker, TrackerOptions,
};
pub use timer::{spawn_poller, AggregateTimer};
