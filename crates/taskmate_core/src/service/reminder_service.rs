//! Reminder use-case service.
//!
//! # Responsibility
//! - List, create, edit and delete reminders through a `DocumentStore`.
//! - Bucket reminders for the reminder screen and register their notifications.
//! - Start the in-app alarm poller over a reminder snapshot.
//!
//! # Invariants
//! - Lists are sorted ascending by trigger time before bucketing.
//! - One agenda pass reads the clock once; bucketing and notification
//!   scheduling share that instant.
//! - Sample reminders are never written and never scheduled.

use crate::agenda::{
    schedule_reminder_notifications, AlarmEntry, AlarmWatcher, ScheduleOutcome,
};
use crate::clock::Clock;
use crate::collab::{Collection, DocumentId, DocumentQuery, DocumentStore, Notifier};
use crate::config::AppConfig;
use crate::model::reminder::{schedule_fields, Reminder, ReminderDraft};
use crate::sample::sample_reminders;
use crate::service::{
    decode_all, ensure_writable, Agenda, FetchOutcome, FetchPolicy, ServiceError, ServiceResult,
};
use crate::validation::{validate_reminder_date, validate_required};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

pub struct ReminderService<S: DocumentStore> {
    store: S,
    clock: Arc<dyn Clock>,
    policy: FetchPolicy,
    notification_lead: TimeDelta,
}

impl<S: DocumentStore> ReminderService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: FetchPolicy::default(),
            notification_lead: TimeDelta::minutes(crate::agenda::DEFAULT_NOTIFICATION_LEAD_MINUTES),
        }
    }

    pub fn from_config(store: S, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self::new(store, clock)
            .with_policy(FetchPolicy::from_config(config))
            .with_notification_lead(config.reminders.notification_lead())
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_notification_lead(mut self, lead: TimeDelta) -> Self {
        self.notification_lead = lead;
        self
    }

    /// All reminders sorted by trigger time.
    ///
    /// # Errors
    /// - `Collaborator` when the store fails and fallback is disabled.
    pub fn list(&self) -> ServiceResult<FetchOutcome<Reminder>> {
        let documents = match self.store.list(Collection::Reminders, &DocumentQuery::all()) {
            Ok(documents) => documents,
            Err(err) if self.policy == FetchPolicy::FallbackToSample => {
                warn!(
                    "event=reminder_list module=service status=fallback error={}",
                    err
                );
                return Ok(FetchOutcome::sample(
                    sample_reminders(self.clock.today()),
                    &err,
                ));
            }
            Err(err) => return Err(err.into()),
        };

        let (mut reminders, rejected) = decode_all(&documents, Reminder::from_document);
        reminders.sort_by_key(|reminder| reminder.trigger_time);
        info!(
            "event=reminder_list module=service status=ok count={} rejected={}",
            reminders.len(),
            rejected.len()
        );
        Ok(FetchOutcome::live(reminders, rejected))
    }

    /// # Errors
    /// - `Validation` when the title is blank.
    pub fn create(&self, draft: &ReminderDraft) -> ServiceResult<Reminder> {
        validate_required("Title", &draft.title)?;
        let document = self.store.create(Collection::Reminders, draft.to_fields())?;
        info!(
            "event=reminder_create module=service status=ok id={}",
            document.id
        );
        Ok(Reminder::from_document(&document)?)
    }

    /// Calendar flow: remind about `task_title` on a future `date`.
    ///
    /// # Errors
    /// - `Validation` when the title is blank or `date` is not after today.
    pub fn set_for_task(
        &self,
        task_title: &str,
        date: NaiveDate,
        time: NaiveTime,
        note: Option<&str>,
    ) -> ServiceResult<Reminder> {
        validate_required("Title", task_title)?;
        validate_reminder_date(date, self.clock.today())?;
        self.create(&ReminderDraft {
            title: task_title.to_string(),
            note: note.map(str::to_string),
            trigger_time: date.and_time(time),
        })
    }

    /// Rewrites the note and trigger time of an existing reminder.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    /// - `InconsistentState` for sample reminders.
    pub fn update(
        &self,
        id: &DocumentId,
        note: Option<&str>,
        trigger_time: NaiveDateTime,
    ) -> ServiceResult<Reminder> {
        ensure_writable(id)?;
        let document = self.store.update(
            Collection::Reminders,
            id,
            schedule_fields(note, trigger_time),
        )?;
        info!("event=reminder_update module=service status=ok id={}", id);
        Ok(Reminder::from_document(&document)?)
    }

    /// Deleting an unknown id succeeds.
    pub fn delete(&self, id: &DocumentId) -> ServiceResult<()> {
        ensure_writable(id)?;
        self.store.delete(Collection::Reminders, id)?;
        info!("event=reminder_delete module=service status=ok id={}", id);
        Ok(())
    }

    /// Reminders bucketed against the clock's current instant.
    pub fn agenda(&self) -> ServiceResult<Agenda<Reminder>> {
        self.agenda_at(self.clock.now())
    }

    pub fn agenda_at(&self, now: NaiveDateTime) -> ServiceResult<Agenda<Reminder>> {
        Ok(Agenda::from_outcome(self.list()?, now))
    }

    /// Registers a notification for every future reminder in `reminders`.
    pub fn schedule_notifications<N: Notifier + ?Sized>(
        &self,
        notifier: &N,
        reminders: &[Reminder],
        now: NaiveDateTime,
    ) -> ScheduleOutcome {
        schedule_reminder_notifications(notifier, reminders, now, self.notification_lead)
    }

    /// One reminder-screen pass: list, bucket and re-register notifications.
    ///
    /// Notifications are skipped when the list came from sample data.
    pub fn refresh<N: Notifier + ?Sized>(
        &self,
        notifier: &N,
    ) -> ServiceResult<(Agenda<Reminder>, ScheduleOutcome)> {
        let now = self.clock.now();
        let outcome = self.list()?;
        let scheduled = if outcome.source.is_sample() {
            ScheduleOutcome::default()
        } else {
            self.schedule_notifications(notifier, &outcome.items, now)
        };
        Ok((Agenda::from_outcome(outcome, now), scheduled))
    }

    /// Starts the alarm poller over a snapshot of `reminders`.
    ///
    /// # Errors
    /// - `InconsistentState` when the worker thread cannot be spawned.
    pub fn watch_alarms<F>(
        &self,
        reminders: &[Reminder],
        interval: Duration,
        on_due: F,
    ) -> ServiceResult<AlarmWatcher>
    where
        F: FnMut(&AlarmEntry) + Send + 'static,
    {
        let entries = reminders.iter().map(AlarmEntry::from).collect();
        AlarmWatcher::start(entries, Arc::clone(&self.clock), interval, on_due).map_err(|err| {
            ServiceError::InconsistentState(format!("failed to start alarm watcher: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ReminderService;
    use crate::clock::FixedClock;
    use crate::collab::{
        CollabResult, CollaboratorError, Collection, Document, DocumentId, DocumentQuery,
        DocumentStore, Fields,
    };
    use crate::service::{DataSource, FetchPolicy, ServiceError};
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct OfflineStore;

    impl DocumentStore for OfflineStore {
        fn list(&self, _: Collection, _: &DocumentQuery) -> CollabResult<Vec<Document>> {
            Err(CollaboratorError::Unavailable("offline".into()))
        }

        fn create(&self, _: Collection, _: Fields) -> CollabResult<Document> {
            Err(CollaboratorError::Unavailable("offline".into()))
        }

        fn update(&self, _: Collection, _: &DocumentId, _: Fields) -> CollabResult<Document> {
            Err(CollaboratorError::Unavailable("offline".into()))
        }

        fn delete(&self, _: Collection, _: &DocumentId) -> CollabResult<()> {
            Err(CollaboratorError::Unavailable("offline".into()))
        }
    }

    fn clock() -> Arc<FixedClock> {
        let now = NaiveDate::from_ymd_opt(2025, 5, 14)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Arc::new(FixedClock::new(now))
    }

    #[test]
    fn store_failure_is_returned_when_fallback_is_off() {
        let service = ReminderService::new(OfflineStore, clock());
        assert!(matches!(
            service.list(),
            Err(ServiceError::Collaborator(CollaboratorError::Unavailable(_)))
        ));
    }

    #[test]
    fn store_failure_serves_marked_sample_data_when_enabled() {
        let service =
            ReminderService::new(OfflineStore, clock()).with_policy(FetchPolicy::FallbackToSample);
        let outcome = service.list().unwrap();
        assert!(matches!(outcome.source, DataSource::Sample { ref cause } if cause.contains("offline")));
        assert_eq!(outcome.items.len(), 4);

        let sample_id = outcome.items[0].id.clone();
        assert!(matches!(
            service.delete(&sample_id),
            Err(ServiceError::InconsistentState(_))
        ));
    }
}
