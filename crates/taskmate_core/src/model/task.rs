//! Task view model.
//!
//! Tasks carry a deadline that feeds the same bucketizer as reminders; a task
//! without a deadline cannot be placed and is reported instead.
//!
//! A `Daily` task's deadline is a time picked for today, so it must not lie in
//! the past when the task is created. `Weekly` and `Monthly` tasks carry a
//! picked date instead.

use crate::agenda::{Bucketable, TimestampError};
use crate::collab::{Collection, Document, DocumentId, Fields};
use crate::model::datetime::{format_date_time, parse_date_time};
use crate::model::normalize_note;
use crate::model::schema::{FieldReader, SchemaError, SchemaIssue};
use chrono::{NaiveDateTime, Timelike};
use serde_json::Value;

pub(crate) const FIELD_TITLE: &str = "title";
pub(crate) const FIELD_DESCRIPTION: &str = "description";
pub(crate) const FIELD_PRIORITY: &str = "priority";
pub(crate) const FIELD_CATEGORY: &str = "Category";
pub(crate) const FIELD_DEADLINE: &str = "Deadline";
pub(crate) const FIELD_STATUS: &str = "status";
pub(crate) const FIELD_COMPLETED: &str = "completed";
pub(crate) const FIELD_IMAGE: &str = "image";
pub(crate) const FIELD_SCHEDULE: &str = "schedule";
pub(crate) const FIELD_SKIP_COUNT: &str = "skipCount";

pub const DEFAULT_CATEGORY: &str = "Work";

/// Skips tolerated before a time of day is suggested.
pub const SKIP_SUGGESTION_THRESHOLD: u32 = 3;

/// Repetition picked on the add-task screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Schedule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Morning is `[5, 12)`, afternoon `[12, 18)`, everything else evening.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

/// Time of day to move a repeatedly skipped task to.
///
/// `None` until the task has been skipped more than
/// [`SKIP_SUGGESTION_THRESHOLD`] times, or when it has no deadline.
pub fn suggest_time_of_day(task: &Task) -> Option<TimeOfDay> {
    if task.skip_count <= SKIP_SUGGESTION_THRESHOLD {
        return None;
    }
    task.deadline
        .map(|deadline| TimeOfDay::from_hour(deadline.hour()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Board column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    MyTasks,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MyTasks => "My Tasks",
            Self::InProgress => "In-progress",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "My Tasks" => Some(Self::MyTasks),
            "In-progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: DocumentId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: String,
    pub deadline: Option<NaiveDateTime>,
    pub status: TaskStatus,
    /// Object-storage id of the attached image.
    pub image: Option<String>,
    pub schedule: Schedule,
    pub skip_count: u32,
}

impl Task {
    /// Decodes a `tasks` document.
    ///
    /// A legacy `completed: true` flag wins over a missing status.
    pub fn from_document(doc: &Document) -> Result<Self, SchemaError> {
        let reader = FieldReader::new(Collection::Tasks, doc);
        let title = reader.required_text(FIELD_TITLE)?;

        let priority = match reader.optional_str(FIELD_PRIORITY)? {
            Some(raw) => reader.parse(FIELD_PRIORITY, raw, Priority::parse)?,
            None => Priority::default(),
        };
        let deadline = match reader.optional_str(FIELD_DEADLINE)? {
            Some(raw) if !raw.trim().is_empty() => {
                Some(reader.parse(FIELD_DEADLINE, raw, parse_date_time)?)
            }
            _ => None,
        };
        let status = match reader.optional_str(FIELD_STATUS)? {
            Some(raw) => TaskStatus::parse(raw).ok_or_else(|| {
                reader.error(
                    FIELD_STATUS,
                    SchemaIssue::Invalid(format!("unknown status `{raw}`")),
                )
            })?,
            None if reader.optional_bool(FIELD_COMPLETED)? == Some(true) => TaskStatus::Completed,
            None => TaskStatus::default(),
        };
        let schedule = match reader.optional_str(FIELD_SCHEDULE)? {
            Some(raw) if !raw.trim().is_empty() => {
                reader.parse(FIELD_SCHEDULE, raw, Schedule::parse)?
            }
            _ => Schedule::default(),
        };
        let category = reader
            .optional_str(FIELD_CATEGORY)?
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        Ok(Self {
            id: doc.id.clone(),
            title: title.trim().to_string(),
            description: normalize_note(reader.optional_str(FIELD_DESCRIPTION)?),
            priority,
            category: category.to_string(),
            deadline,
            status,
            image: normalize_note(reader.optional_str(FIELD_IMAGE)?),
            schedule,
            skip_count: reader.optional_count(FIELD_SKIP_COUNT)?.unwrap_or(0),
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

impl Bucketable for Task {
    fn bucket_instant(&self) -> Result<NaiveDateTime, TimestampError> {
        self.deadline.ok_or(TimestampError::Missing)
    }

    fn missed_eligible(&self) -> bool {
        !self.is_completed()
    }
}

/// Editable task contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub status: TaskStatus,
    pub schedule: Schedule,
}

impl TaskDraft {
    /// Body written to the store. `image` is the uploaded object id, if any.
    pub fn to_fields(&self, image: Option<&str>) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_TITLE.to_string(), Value::String(self.title.trim().to_string()));
        fields.insert(
            FIELD_DESCRIPTION.to_string(),
            Value::String(self.description.as_deref().unwrap_or_default().trim().to_string()),
        );
        fields.insert(
            FIELD_PRIORITY.to_string(),
            Value::String(self.priority.as_str().to_string()),
        );
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        fields.insert(FIELD_CATEGORY.to_string(), Value::String(category.to_string()));
        if let Some(deadline) = self.deadline {
            fields.insert(
                FIELD_DEADLINE.to_string(),
                Value::String(format_date_time(deadline)),
            );
        }
        fields.insert(
            FIELD_STATUS.to_string(),
            Value::String(self.status.as_str().to_string()),
        );
        fields.insert(
            FIELD_COMPLETED.to_string(),
            Value::Bool(self.status == TaskStatus::Completed),
        );
        fields.insert(
            FIELD_SCHEDULE.to_string(),
            Value::String(self.schedule.as_str().to_string()),
        );
        if let Some(image) = image {
            fields.insert(FIELD_IMAGE.to_string(), Value::String(image.to_string()));
        }
        fields
    }
}

/// Fields written when the skip counter changes.
pub(crate) fn skip_count_fields(skip_count: u32) -> Fields {
    let mut fields = Fields::new();
    fields.insert(FIELD_SKIP_COUNT.to_string(), Value::from(skip_count));
    fields
}

/// Fields written when only the status changes.
pub(crate) fn status_fields(status: TaskStatus) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        FIELD_STATUS.to_string(),
        Value::String(status.as_str().to_string()),
    );
    fields.insert(
        FIELD_COMPLETED.to_string(),
        Value::Bool(status == TaskStatus::Completed),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::{suggest_time_of_day, Priority, Schedule, Task, TaskStatus, TimeOfDay};
    use crate::agenda::{Bucketable, TimestampError};
    use crate::collab::{Document, DocumentId};
    use serde_json::json;

    fn decode(fields: serde_json::Value) -> Result<Task, crate::model::schema::SchemaError> {
        Task::from_document(&Document {
            id: DocumentId::new("t1"),
            fields: fields.as_object().cloned().unwrap(),
        })
    }

    #[test]
    fn applies_defaults_for_optional_fields() {
        let task = decode(json!({ "title": "Fix Bugs" })).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category, "Work");
        assert_eq!(task.status, TaskStatus::MyTasks);
        assert_eq!(task.bucket_instant(), Err(TimestampError::Missing));
    }

    #[test]
    fn legacy_completed_flag_maps_to_completed_status() {
        let task = decode(json!({ "title": "Fix Bugs", "completed": true })).unwrap();
        assert!(task.is_completed());
        assert!(!task.missed_eligible());
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let err = decode(json!({ "title": "Fix Bugs", "priority": "Urgent" })).unwrap_err();
        assert_eq!(err.field, "priority");
    }

    #[test]
    fn parses_iso_deadline() {
        let task = decode(json!({
            "title": "Pitch deck",
            "Deadline": "2025-03-30T14:00:00.000Z",
            "status": "In-progress"
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(
            task.deadline.map(|value| value.to_string()),
            Some("2025-03-30 14:00:00".to_string())
        );
    }

    #[test]
    fn reads_schedule_and_skip_count() {
        let task = decode(json!({
            "title": "Standup",
            "schedule": "weekly",
            "skipCount": 2
        }))
        .unwrap();
        assert_eq!(task.schedule, Schedule::Weekly);
        assert_eq!(task.skip_count, 2);

        let task = decode(json!({ "title": "Standup" })).unwrap();
        assert_eq!(task.schedule, Schedule::Daily);
        assert_eq!(task.skip_count, 0);

        let err = decode(json!({ "title": "Standup", "skipCount": -1 })).unwrap_err();
        assert_eq!(err.field, "skipCount");
        let err = decode(json!({ "title": "Standup", "schedule": "Yearly" })).unwrap_err();
        assert_eq!(err.field, "schedule");
    }

    #[test]
    fn time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
    }

    #[test]
    fn suggestion_needs_more_than_three_skips() {
        let mut task = decode(json!({
            "title": "Gym",
            "Deadline": "2025-05-14T13:30:00",
            "skipCount": 3
        }))
        .unwrap();
        assert_eq!(suggest_time_of_day(&task), None);

        task.skip_count = 4;
        assert_eq!(suggest_time_of_day(&task), Some(TimeOfDay::Afternoon));

        task.deadline = None;
        assert_eq!(suggest_time_of_day(&task), None);
    }
}
