//! # studytimer core library
//!
//! This library provides the core logic for a profile-based study timer:
//! study phases alternate with short breaks, every Nth study phase earns a
//! long break, and each profile keeps lifetime statistics. Any UI (the
//! bundled CLI, a desktop window, a tray applet) is a thin layer over the
//! same engine.
//!
//! ## Architecture
//!
//! - **Session Engine**: a tick-driven state machine with no thread and no
//!   I/O; the caller invokes `tick()` periodically and forwards commands
//! - **Profiles**: an ordered, capped list of study configurations plus the
//!   active selection
//! - **Storage**: global settings and a persistence gateway (TOML file or
//!   in-memory)
//! - **Host**: owns one engine, its profiles and settings, and persists them
//! - **History**: one record per finished run, appended through the gateway
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core timer state machine
//! - [`ProfileStore`]: Profile list with the active selection
//! - [`PersistenceGateway`]: Load/save boundary
//! - [`StudyTimer`]: Host object tying the pieces together

pub mod clock;
pub mod error;
pub mod events;
pub mod history;
pub mod host;
pub mod notify;
pub mod profile;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, PersistenceError, ProfileError, SessionError, ValidationError};
pub use events::SessionEvent;
pub use history::RunRecord;
pub use host::StudyTimer;
pub use notify::{LogSink, NotificationSink, NullSink, RecordingSink};
pub use profile::{Profile, ProfileStore, MAX_PROFILES};
pub use storage::{GlobalSettings, MemoryGateway, PersistenceGateway, Theme, TomlGateway};
pub use timer::{Command, Outcome, Phase, SessionEngine, SessionSnapshot, StopSummary};
