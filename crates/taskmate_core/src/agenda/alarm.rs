//! In-app alarm poller.
//!
//! A worker thread wakes every `interval`, compares the clock against a cached
//! snapshot of reminder times and fires `on_due` once per reminder whose time
//! has arrived. Reminders already due when the watcher starts are treated as
//! handled and never fire.
//!
//! # Invariants
//! - The worker stops on `stop()` or when the watcher is dropped; no thread
//!   outlives its watcher.

use crate::clock::Clock;
use crate::collab::DocumentId;
use crate::model::reminder::Reminder;
use chrono::NaiveDateTime;
use log::{debug, info};
use std::collections::HashSet;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cached reminder time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEntry {
    pub id: DocumentId,
    pub title: String,
    pub trigger_time: NaiveDateTime,
}

impl From<&Reminder> for AlarmEntry {
    fn from(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id.clone(),
            title: reminder.title.clone(),
            trigger_time: reminder.trigger_time,
        }
    }
}

/// Entries due at `now` that have not fired yet.
pub fn due_alarms<'a>(
    entries: &'a [AlarmEntry],
    now: NaiveDateTime,
    fired: &HashSet<DocumentId>,
) -> Vec<&'a AlarmEntry> {
    entries
        .iter()
        .filter(|entry| entry.trigger_time <= now && !fired.contains(&entry.id))
        .collect()
}

/// Handle to a running poller.
pub struct AlarmWatcher {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl AlarmWatcher {
    /// Starts polling `entries` every `interval`.
    ///
    /// # Errors
    /// - Returns the OS error when the worker thread cannot be spawned.
    pub fn start<F>(
        entries: Vec<AlarmEntry>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        mut on_due: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut(&AlarmEntry) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let started_at = clock.now();
        let mut fired: HashSet<DocumentId> = due_alarms(&entries, started_at, &HashSet::new())
            .into_iter()
            .map(|entry| entry.id.clone())
            .collect();
        info!(
            "event=alarm_watch module=agenda status=start entries={} already_due={} interval_ms={}",
            entries.len(),
            fired.len(),
            interval.as_millis()
        );

        let worker = thread::Builder::new()
            .name("taskmate-alarm".to_string())
            .spawn(move || loop {
                let now = clock.now();
                for entry in due_alarms(&entries, now, &fired) {
                    debug!("event=alarm_fire module=agenda status=ok reminder_id={}", entry.id);
                    on_due(entry);
                    fired.insert(entry.id.clone());
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }

    /// Cancels the poller and waits for the worker to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("event=alarm_watch module=agenda status=error error=worker_panicked");
            } else {
                info!("event=alarm_watch module=agenda status=stopped");
            }
        }
    }
}

impl Drop for AlarmWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::{due_alarms, AlarmEntry, AlarmWatcher};
    use crate::clock::FixedClock;
    use crate::collab::DocumentId;
    use crate::model::datetime::parse_date_time;
    use chrono::{NaiveDateTime, TimeDelta};
    use std::collections::HashSet;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    fn at(raw: &str) -> NaiveDateTime {
        parse_date_time(raw).unwrap()
    }

    fn entry(id: &str, raw: &str) -> AlarmEntry {
        AlarmEntry {
            id: DocumentId::new(id),
            title: id.to_string(),
            trigger_time: at(raw),
        }
    }

    #[test]
    fn due_alarms_skips_future_and_fired() {
        let entries = vec![
            entry("a", "2025-05-14T09:00:00"),
            entry("b", "2025-05-14T10:00:00"),
            entry("c", "2025-05-14T11:00:00"),
        ];
        let fired: HashSet<DocumentId> = [DocumentId::new("a")].into_iter().collect();
        let due = due_alarms(&entries, at("2025-05-14T10:00:00"), &fired);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, DocumentId::new("b"));
    }

    #[test]
    fn watcher_fires_once_when_trigger_arrives_and_stops() {
        let clock = Arc::new(FixedClock::new(at("2025-05-14T09:59:00")));
        let entries = vec![
            entry("stale", "2025-05-14T09:00:00"),
            entry("next", "2025-05-14T10:00:00"),
        ];
        let (tx, rx) = mpsc::channel();
        let watcher = AlarmWatcher::start(
            entries,
            clock.clone(),
            Duration::from_millis(5),
            move |entry| {
                let _ = tx.send(entry.id.clone());
            },
        )
        .unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        clock.advance(TimeDelta::minutes(1));
        let fired = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(fired, DocumentId::new("next"));
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        assert!(watcher.is_running());
        watcher.stop();
    }
}
