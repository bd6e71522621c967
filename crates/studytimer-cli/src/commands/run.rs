//! Foreground study session.
//!
//! Ticks the engine once a second and reads single-word commands from
//! stdin while the run is active. Ctrl-C stops the run and records it.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use clap::Args;
use studytimer_core::timer::format_clock;
use studytimer_core::{
    Command, NotificationSink, Outcome, Phase, SessionSnapshot, StopSummary, StudyTimer,
    TomlGateway,
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::{open_timer, CliResult};
use crate::sink::TerminalSink;

#[derive(Args)]
pub struct RunArgs {
    /// Profile index to study with (default: the active profile)
    #[arg(long)]
    profile: Option<usize>,
    /// What you are studying (default: the last subject)
    #[arg(long)]
    subject: Option<String>,
    /// Print events and the summary as JSON lines
    #[arg(long)]
    json: bool,
}

/// What a line typed during the run asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Unknown,
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Input::Command(Command::Pause),
        "r" | "resume" => Input::Command(Command::Resume),
        "" | "t" | "toggle" => Input::Command(Command::TogglePause),
        "s" | "stop" | "q" | "quit" => Input::Command(Command::Stop),
        _ => Input::Unknown,
    }
}

pub fn run(args: RunArgs, data_dir: Option<&Path>) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_loop(args, data_dir));
    // Leave the stdin reader and signal driver behind instead of joining them.
    runtime.shutdown_background();
    result
}

/// Forward stdin lines from a plain thread.
///
/// A blocked terminal read cannot be cancelled, so the reader is detached
/// and simply dies with the process. The channel closes at EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn run_loop(args: RunArgs, data_dir: Option<&Path>) -> CliResult {
    let json = args.json;
    let mut timer = open_timer(data_dir, TerminalSink::new(json));

    if let Some(index) = args.profile {
        timer.switch_profile(index)?;
    }
    let subject = args
        .subject
        .unwrap_or_else(|| timer.settings().last_subject.clone());
    timer.start(subject)?;
    warn_unsaved(&mut timer);

    if !json {
        let snap = timer.snapshot();
        eprintln!(
            "Studying with '{}' ({}). Commands: [enter]/t toggle pause, p pause, r resume, s stop",
            snap.profile_name,
            snap.remaining_clock()
        );
    }

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let stopped: Option<StopSummary> = loop {
        tokio::select! {
            _ = interval.tick() => {
                timer.dispatch(Command::Tick)?;
                warn_unsaved(&mut timer);
                if timer.engine().is_idle() {
                    break None;
                }
                if !json {
                    render_status(&timer.snapshot());
                }
            }
            line = lines.recv(), if stdin_open => {
                let Some(line) = line else {
                    stdin_open = false;
                    continue;
                };
                match parse_input(&line) {
                    Input::Command(command) => match timer.dispatch(command) {
                        Ok(Outcome::Stopped(summary)) => break summary,
                        Ok(_) => {
                            if !json {
                                render_status(&timer.snapshot());
                            }
                        }
                        Err(e) => eprintln!("\n{e}"),
                    },
                    Input::Unknown => eprintln!("\nunknown command: {}", line.trim()),
                }
            }
            result = &mut ctrl_c => {
                result?;
                break timer.stop();
            }
        }
    };

    let profile = timer.store().active().clone();
    if json {
        let summary = serde_json::json!({
            "type": "run_ended",
            "stopped": stopped,
            "profile": profile,
        });
        println!("{summary}");
    } else {
        eprintln!();
        if let Some(summary) = stopped {
            eprintln!(
                "Session stopped: {} of study recorded",
                format_clock(summary.credited_study_seconds)
            );
        } else {
            eprintln!("Break complete - ready for next session");
        }
        let (hours, minutes) = profile.study_time_hm();
        eprintln!(
            "{}: {hours}h {minutes}m total, {} completed / {} total sessions",
            profile.name, profile.completed_sessions, profile.total_sessions
        );
    }

    timer.shutdown()?;
    Ok(())
}

fn render_status(snap: &SessionSnapshot) {
    let label = match snap.phase {
        Phase::Studying => "Studying",
        Phase::Breaking if snap.is_long_break => "Long break",
        Phase::Breaking => "Break",
        Phase::Paused(_) => "Paused",
        Phase::Idle => "Idle",
    };
    let subject = if snap.subject.is_empty() {
        String::new()
    } else {
        format!(" - {}", snap.subject)
    };
    eprint!(
        "\r\x1b[2K{label} {} ({:.0}%) {}{subject}",
        snap.remaining_clock(),
        snap.progress_pct,
        snap.profile_name
    );
    let _ = std::io::stderr().flush();
}

fn warn_unsaved<N: NotificationSink>(timer: &mut StudyTimer<TomlGateway, N>) {
    if let Some(e) = timer.take_persist_error() {
        eprintln!("\nwarning: {e}");
    }
}
