//! Built-in placeholder data for degraded mode.
//!
//! Dates are laid out around the given day so every bucket has an entry.
//! Ids carry a `sample-` prefix and never collide with store-assigned UUIDs.

use crate::collab::DocumentId;
use crate::model::goal::{Goal, TimeFrame};
use crate::model::reminder::Reminder;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

pub const SAMPLE_ID_PREFIX: &str = "sample-";

pub fn is_sample_id(id: &DocumentId) -> bool {
    id.as_str().starts_with(SAMPLE_ID_PREFIX)
}

/// Reminders sorted by trigger time: one missed, one today, one tomorrow, one upcoming.
pub fn sample_reminders(today: NaiveDate) -> Vec<Reminder> {
    let reminder = |n: u8, title: &str, note: Option<&str>, at: NaiveDateTime| Reminder {
        id: DocumentId::new(format!("{SAMPLE_ID_PREFIX}reminder-{n}")),
        title: title.to_string(),
        note: note.map(str::to_string),
        trigger_time: at,
    };
    vec![
        reminder(
            1,
            "Team Meeting",
            Some("Weekly sync with the design team"),
            at(shift_back(today, 1), 17, 0),
        ),
        reminder(2, "Code Review", None, at(today, 23, 0)),
        reminder(
            3,
            "Client Presentation",
            Some("Bring the updated slides"),
            at(shift(today, 1), 9, 0),
        ),
        reminder(4, "Database Migration", None, at(shift(today, 6), 12, 0)),
    ]
}

/// Goals sorted by end date covering the four buckets.
///
/// Goals fall due at the start of their end date, so the one in `today` is
/// already completed.
pub fn sample_goals(today: NaiveDate) -> Vec<Goal> {
    let goal = |n: u8,
                name: &str,
                start: NaiveDate,
                end: NaiveDate,
                completed: bool,
                time_frame: Option<TimeFrame>| Goal {
        id: DocumentId::new(format!("{SAMPLE_ID_PREFIX}goal-{n}")),
        name: name.to_string(),
        note: None,
        start_date: start,
        end_date: end,
        completed,
        time_frame,
    };
    vec![
        goal(
            1,
            "WriteDocumentation",
            shift_back(today, 8),
            shift_back(today, 1),
            false,
            Some(TimeFrame::OneWeek),
        ),
        goal(2, "FixLoginIssue", shift_back(today, 1), today, true, Some(TimeFrame::OneDay)),
        goal(3, "BugFixSprint", shift_back(today, 6), shift(today, 1), false, Some(TimeFrame::OneWeek)),
        goal(
            4,
            "AddNewFeature",
            today,
            TimeFrame::OneMonth
                .end_date_from(today)
                .unwrap_or_else(|| shift(today, 30)),
            false,
            Some(TimeFrame::OneMonth),
        ),
    ]
}

fn shift(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_add_days(Days::new(days)).unwrap_or(day)
}

fn shift_back(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(days)).unwrap_or(day)
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}
