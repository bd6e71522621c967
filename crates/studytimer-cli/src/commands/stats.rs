use std::path::Path;

use chrono::Local;
use studytimer_core::RunRecord;

use super::{open_quiet, CliResult};

/// Runs shown in the text report; `--json` prints all of them.
const RECENT_RUNS: usize = 10;

pub fn run(json: bool, data_dir: Option<&Path>) -> CliResult {
    let timer = open_quiet(data_dir);
    let store = timer.store();
    let history = timer.history()?;

    if json {
        let rows: Vec<_> = store
            .profiles()
            .iter()
            .enumerate()
            .map(|(index, p)| {
                serde_json::json!({
                    "index": index,
                    "name": p.name,
                    "active": index == store.active_index(),
                    "total_study_time": p.total_study_time,
                    "total_sessions": p.total_sessions,
                    "completed_sessions": p.completed_sessions,
                })
            })
            .collect();
        let report = serde_json::json!({
            "profiles": rows,
            "history": history,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (index, profile) in store.profiles().iter().enumerate() {
        let active = if index == store.active_index() {
            " [ACTIVE]"
        } else {
            ""
        };
        let (hours, minutes) = profile.study_time_hm();
        println!("{}{active}", profile.name);
        println!(
            "  Study: {}m  Break: {}m  Long Break: {}m",
            profile.study_minutes, profile.break_minutes, profile.long_break_minutes
        );
        println!("  Total Time: {hours}h {minutes}m");
        println!(
            "  Sessions: {} completed / {} total",
            profile.completed_sessions, profile.total_sessions
        );
    }

    if !history.is_empty() {
        println!();
        println!("Recent runs:");
        let skip = history.len().saturating_sub(RECENT_RUNS);
        for record in &history[skip..] {
            println!("  {}", format_run(record));
        }
    }
    Ok(())
}

fn format_run(record: &RunRecord) -> String {
    let started = record.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let subject = if record.subject.is_empty() {
        "(no subject)"
    } else {
        record.subject.as_str()
    };
    let ending = if record.stopped { ", stopped" } else { "" };
    format!(
        "[{started}] {} - {subject}: {}m studied, {} completed{ending}",
        record.profile,
        record.study_minutes(),
        record.completed_phases
    )
}
