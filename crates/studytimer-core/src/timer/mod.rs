mod command;
mod engine;
mod session;
mod snapshot;

pub use command::{Command, Outcome};
pub use engine::{SessionEngine, StopSummary};
pub use session::{ActivePhase, Phase, Session};
pub use snapshot::{format_clock, SessionSnapshot};
