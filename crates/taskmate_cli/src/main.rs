//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskmate_core` linkage without the mobile shell.
//! - Print the reminder and goal agenda for a local database.
//!
//! Usage: `taskmate_cli [config.toml]`

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use taskmate_core::agenda::Bucket;
use taskmate_core::collab::LogNotifier;
use taskmate_core::db::open_db;
use taskmate_core::{
    AppConfig, Clock, GoalService, ReminderService, SqliteDocumentStore, SystemClock,
};

const NEXT_GOALS: u32 = 3;

fn main() -> ExitCode {
    println!("taskmate_core ping={}", taskmate_core::ping());
    println!("taskmate_core version={}", taskmate_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(Path::new(&path)),
        None => AppConfig::from_env(),
    }
    .map_err(|err| err.to_string())?;

    if let Err(err) = taskmate_core::init_logging_from_config(&config.logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = open_db(&config.storage.db_path).map_err(|err| err.to_string())?;
    let store = SqliteDocumentStore::new(&conn);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    println!("now={}", clock.now().format("%Y-%m-%d %H:%M"));

    let reminders = ReminderService::from_config(&store, Arc::clone(&clock), &config);
    let (agenda, scheduled) = reminders
        .refresh(&LogNotifier)
        .map_err(|err| err.to_string())?;
    println!(
        "reminders source={:?} notifications={}",
        agenda.source,
        scheduled.scheduled.len()
    );
    for bucket in Bucket::ALL {
        for reminder in agenda.report.buckets.get(bucket) {
            println!(
                "  [{}] {} {}",
                bucket.as_str(),
                reminder.trigger_time.format("%Y-%m-%d %H:%M"),
                reminder.title
            );
        }
    }

    let goals = GoalService::from_config(&store, clock, &config);
    let agenda = goals.agenda().map_err(|err| err.to_string())?;
    let progress = goals.progress().map_err(|err| err.to_string())?;
    println!(
        "goals source={:?} placed={} progress={}%",
        agenda.source,
        agenda.report.buckets.len(),
        progress.percent()
    );
    for (bucket, goal) in agenda.report.buckets.iter() {
        println!(
            "  [{}] {} ends {}{}",
            bucket.as_str(),
            goal.name,
            goal.end_date,
            if goal.completed { " (done)" } else { "" }
        );
    }
    for err in &agenda.schema_errors {
        println!("  skipped: {err}");
    }

    let next = goals.open_goals(NEXT_GOALS).map_err(|err| err.to_string())?;
    for goal in &next.items {
        println!("  next: {} ends {}", goal.name, goal.end_date);
    }
    Ok(())
}
