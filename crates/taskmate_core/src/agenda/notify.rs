//! Local-notification scheduling for reminders.
//!
//! Every pass re-registers every future reminder. Duplicate OS notifications
//! after repeated passes are an accepted limitation; nothing is cancelled.

use crate::collab::{CollaboratorError, DocumentId, NotificationPayload, Notifier};
use crate::model::reminder::Reminder;
use chrono::{NaiveDateTime, TimeDelta};
use log::{info, warn};

pub const DEFAULT_NOTIFICATION_LEAD_MINUTES: i64 = 30;

/// When to fire for a reminder due at `trigger`.
///
/// Returns `None` unless `trigger` is strictly after `now`. A lead that would
/// land in the past is clamped to `now`.
pub fn notification_fire_time(
    trigger: NaiveDateTime,
    now: NaiveDateTime,
    lead: TimeDelta,
) -> Option<NaiveDateTime> {
    if trigger <= now {
        return None;
    }
    let fire_at = trigger.checked_sub_signed(lead).unwrap_or(trigger);
    Some(fire_at.max(now))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub reminder_id: DocumentId,
    pub fire_at: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct ScheduleOutcome {
    pub scheduled: Vec<ScheduledNotification>,
    /// Reminders already due at `now`.
    pub skipped: usize,
    pub failures: Vec<(DocumentId, CollaboratorError)>,
}

/// Hands one notification request per future reminder to `notifier`.
///
/// A failing request is recorded and the pass continues.
pub fn schedule_reminder_notifications<N: Notifier + ?Sized>(
    notifier: &N,
    reminders: &[Reminder],
    now: NaiveDateTime,
    lead: TimeDelta,
) -> ScheduleOutcome {
    let mut outcome = ScheduleOutcome::default();

    for reminder in reminders {
        let Some(fire_at) = notification_fire_time(reminder.trigger_time, now, lead) else {
            outcome.skipped += 1;
            continue;
        };
        let payload = NotificationPayload {
            source_id: reminder.id.clone(),
            title: reminder.title.clone(),
            body: reminder.note.clone().unwrap_or_else(|| {
                format!("Due at {}", reminder.trigger_time.format("%H:%M on %Y-%m-%d"))
            }),
        };
        match notifier.schedule_local_notification(&payload, fire_at) {
            Ok(()) => outcome.scheduled.push(ScheduledNotification {
                reminder_id: reminder.id.clone(),
                fire_at,
            }),
            Err(err) => {
                warn!(
                    "event=reminder_notify module=agenda status=error reminder_id={} error={}",
                    reminder.id, err
                );
                outcome.failures.push((reminder.id.clone(), err));
            }
        }
    }

    info!(
        "event=reminder_notify module=agenda status=ok scheduled={} skipped={} failed={}",
        outcome.scheduled.len(),
        outcome.skipped,
        outcome.failures.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::{notification_fire_time, schedule_reminder_notifications};
    use crate::collab::{
        CollabResult, CollaboratorError, DocumentId, NotificationPayload, Notifier,
    };
    use crate::model::datetime::parse_date_time;
    use crate::model::reminder::Reminder;
    use chrono::{NaiveDateTime, TimeDelta};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingNotifier {
        calls: RefCell<Vec<(NotificationPayload, NaiveDateTime)>>,
        fail_for: Option<&'static str>,
    }

    impl Notifier for RecordingNotifier {
        fn schedule_local_notification(
            &self,
            payload: &NotificationPayload,
            fire_at: NaiveDateTime,
        ) -> CollabResult<()> {
            if self.fail_for == Some(payload.source_id.as_str()) {
                return Err(CollaboratorError::Unavailable("notifications off".into()));
            }
            self.calls.borrow_mut().push((payload.clone(), fire_at));
            Ok(())
        }
    }

    fn at(raw: &str) -> NaiveDateTime {
        parse_date_time(raw).unwrap()
    }

    fn reminder(id: &str, raw: &str, note: Option<&str>) -> Reminder {
        Reminder {
            id: DocumentId::new(id),
            title: format!("title {id}"),
            note: note.map(str::to_string),
            trigger_time: at(raw),
        }
    }

    #[test]
    fn fire_time_is_lead_before_trigger() {
        let lead = TimeDelta::minutes(30);
        let now = at("2025-05-14T08:00:00");
        assert_eq!(
            notification_fire_time(at("2025-05-14T10:00:00"), now, lead),
            Some(at("2025-05-14T09:30:00"))
        );
        assert_eq!(
            notification_fire_time(at("2025-05-14T08:10:00"), now, lead),
            Some(now)
        );
        assert_eq!(notification_fire_time(now, now, lead), None);
    }

    #[test]
    fn schedules_only_future_reminders() {
        let notifier = RecordingNotifier::default();
        let reminders = vec![
            reminder("past", "2025-05-13T23:00:00", None),
            reminder("soon", "2025-05-14T10:00:00", Some("bring slides")),
            reminder("later", "2025-05-20T12:00:00", None),
        ];

        let outcome = schedule_reminder_notifications(
            &notifier,
            &reminders,
            at("2025-05-14T00:00:00"),
            TimeDelta::minutes(30),
        );

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.scheduled.len(), 2);
        let calls = notifier.calls.borrow();
        assert_eq!(calls[0].0.body, "bring slides");
        assert_eq!(calls[0].1, at("2025-05-14T09:30:00"));
        assert!(calls[1].0.body.starts_with("Due at 12:00"));
    }

    #[test]
    fn one_failure_does_not_stop_the_pass() {
        let notifier = RecordingNotifier {
            fail_for: Some("a"),
            ..RecordingNotifier::default()
        };
        let reminders = vec![
            reminder("a", "2025-05-15T10:00:00", None),
            reminder("b", "2025-05-15T11:00:00", None),
        ];
        let outcome = schedule_reminder_notifications(
            &notifier,
            &reminders,
            at("2025-05-14T00:00:00"),
            TimeDelta::minutes(30),
        );
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, DocumentId::new("a"));
        assert_eq!(outcome.scheduled.len(), 1);
    }

    #[test]
    fn rescheduling_is_repeatable() {
        let notifier = RecordingNotifier::default();
        let reminders = vec![reminder("a", "2025-05-15T10:00:00", None)];
        let now = at("2025-05-14T00:00:00");
        let lead = TimeDelta::minutes(30);
        schedule_reminder_notifications(&notifier, &reminders, now, lead);
        schedule_reminder_notifications(&notifier, &reminders, now, lead);
        assert_eq!(notifier.calls.borrow().len(), 2);
    }
}
