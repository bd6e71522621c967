pub mod config;
pub mod profile;
pub mod run;
pub mod stats;

use std::error::Error;
use std::path::Path;

use studytimer_core::{NotificationSink, NullSink, StudyTimer, TomlGateway};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Open the persisted timer state in `data_dir` (or the default location).
pub fn open_timer<N: NotificationSink>(
    data_dir: Option<&Path>,
    sink: N,
) -> StudyTimer<TomlGateway, N> {
    let gateway = match data_dir {
        Some(dir) => TomlGateway::in_dir(dir),
        None => TomlGateway::default_location(),
    };
    StudyTimer::open(gateway, sink)
}

/// Open without notifications, for the management commands.
pub fn open_quiet(data_dir: Option<&Path>) -> StudyTimer<TomlGateway, NullSink> {
    open_timer(data_dir, NullSink)
}

/// Turn a deferred save failure into a command failure.
pub fn check_saved<N: NotificationSink>(timer: &mut StudyTimer<TomlGateway, N>) -> CliResult {
    match timer.take_persist_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
