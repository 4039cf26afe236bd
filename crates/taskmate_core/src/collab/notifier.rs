//! OS local-notification contract.

use super::{CollabResult, DocumentId};
use chrono::NaiveDateTime;
use log::info;

/// What the OS shows when the notification fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Reminder the notification belongs to.
    pub source_id: DocumentId,
    pub title: String,
    pub body: String,
}

pub trait Notifier {
    fn schedule_local_notification(
        &self,
        payload: &NotificationPayload,
        fire_at: NaiveDateTime,
    ) -> CollabResult<()>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn schedule_local_notification(
        &self,
        payload: &NotificationPayload,
        fire_at: NaiveDateTime,
    ) -> CollabResult<()> {
        (**self).schedule_local_notification(payload, fire_at)
    }
}

/// Records requests in the log instead of reaching an OS service.
///
/// Used by headless hosts (CLI, desktop previews) where the UI shell owns the
/// actual notification channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn schedule_local_notification(
        &self,
        payload: &NotificationPayload,
        fire_at: NaiveDateTime,
    ) -> CollabResult<()> {
        info!(
            "event=notification_schedule module=notifier status=ok source_id={} fire_at={}",
            payload.source_id,
            fire_at.format("%Y-%m-%dT%H:%M:%S")
        );
        Ok(())
    }
}
