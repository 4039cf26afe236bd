//! Temporal classification and reminder delivery.
//!
//! # Responsibility
//! - Partition timestamped records into missed/today/tomorrow/upcoming.
//! - Turn future reminders into local-notification requests.
//! - Poll cached reminder times and raise alarms as they come due.
//!
//! # Invariants
//! - Classification is pure: same items and same `now` give the same buckets.
//! - One reference instant is used for a whole classification pass.

pub mod alarm;
pub mod bucketizer;
pub mod notify;

pub use alarm::{due_alarms, AlarmEntry, AlarmWatcher};
pub use bucketizer::{
    bucketize, classify, Bucket, BucketReport, Bucketable, BucketingError, Buckets,
    DayBoundaries, TimestampError,
};
pub use notify::{
    notification_fire_time, schedule_reminder_notifications, ScheduleOutcome,
    ScheduledNotification, DEFAULT_NOTIFICATION_LEAD_MINUTES,
};
