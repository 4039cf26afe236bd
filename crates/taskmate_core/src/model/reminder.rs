//! Reminder view model.
//!
//! # Invariants
//! - `title` is never blank.
//! - `trigger_time` is the instant the reminder is due; its bucket is derived
//!   at read time and never stored.

use crate::agenda::{Bucketable, TimestampError};
use crate::collab::{Collection, Document, DocumentId, Fields};
use crate::model::datetime::{format_date, format_time, parse_date, parse_time};
use crate::model::normalize_note;
use crate::model::schema::{FieldReader, SchemaError};
use chrono::NaiveDateTime;
use serde_json::Value;

pub(crate) const FIELD_TITLE: &str = "TaskTitle";
pub(crate) const FIELD_DATE: &str = "Date";
pub(crate) const FIELD_TIME: &str = "SetTime";
pub(crate) const FIELD_NOTE: &str = "Note";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: DocumentId,
    pub title: String,
    pub note: Option<String>,
    pub trigger_time: NaiveDateTime,
}

impl Reminder {
    /// Decodes a `reminders` document.
    ///
    /// # Errors
    /// - `SchemaError` when the title is missing/blank or the date/time fields
    ///   are missing or unparseable.
    pub fn from_document(doc: &Document) -> Result<Self, SchemaError> {
        let reader = FieldReader::new(Collection::Reminders, doc);
        let title = reader.required_text(FIELD_TITLE)?;
        let date_raw = reader.required_str(FIELD_DATE)?;
        let date = reader.parse(FIELD_DATE, date_raw, parse_date)?;
        let time_raw = reader.required_str(FIELD_TIME)?;
        let time = reader.parse(FIELD_TIME, time_raw, parse_time)?;

        Ok(Self {
            id: doc.id.clone(),
            title: title.trim().to_string(),
            note: normalize_note(reader.optional_str(FIELD_NOTE)?),
            trigger_time: date.and_time(time),
        })
    }
}

impl Bucketable for Reminder {
    fn bucket_instant(&self) -> Result<NaiveDateTime, TimestampError> {
        Ok(self.trigger_time)
    }
}

/// New reminder before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDraft {
    pub title: String,
    pub note: Option<String>,
    pub trigger_time: NaiveDateTime,
}

impl ReminderDraft {
    pub fn to_fields(&self) -> Fields {
        let mut fields = schedule_fields(self.note.as_deref(), self.trigger_time);
        fields.insert(
            FIELD_TITLE.to_string(),
            Value::String(self.title.trim().to_string()),
        );
        fields
    }
}

/// Fields rewritten when a reminder's note or time is edited.
pub(crate) fn schedule_fields(note: Option<&str>, trigger_time: NaiveDateTime) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        FIELD_DATE.to_string(),
        Value::String(format_date(trigger_time.date())),
    );
    fields.insert(
        FIELD_TIME.to_string(),
        Value::String(format_time(trigger_time.time())),
    );
    fields.insert(
        FIELD_NOTE.to_string(),
        Value::String(note.unwrap_or_default().trim().to_string()),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::{Reminder, ReminderDraft};
    use crate::collab::{Document, DocumentId};
    use crate::model::schema::SchemaIssue;
    use chrono::NaiveDate;
    use serde_json::json;

    fn document(fields: serde_json::Value) -> Document {
        Document {
            id: DocumentId::new("r1"),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn decodes_date_and_time_into_trigger() {
        let doc = document(json!({
            "TaskTitle": "Client Call",
            "Date": "2025-05-15",
            "SetTime": "09:00",
            "Note": ""
        }));
        let reminder = Reminder::from_document(&doc).unwrap();
        assert_eq!(reminder.title, "Client Call");
        assert_eq!(reminder.note, None);
        assert_eq!(
            reminder.trigger_time,
            NaiveDate::from_ymd_opt(2025, 5, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn rejects_unparseable_time() {
        let doc = document(json!({
            "TaskTitle": "Client Call",
            "Date": "2025-05-15",
            "SetTime": "nine"
        }));
        let err = Reminder::from_document(&doc).unwrap_err();
        assert_eq!(err.field, "SetTime");
        assert!(matches!(err.issue, SchemaIssue::Invalid(_)));
    }

    #[test]
    fn rejects_non_string_title() {
        let doc = document(json!({ "TaskTitle": 7, "Date": "2025-05-15", "SetTime": "09:00" }));
        let err = Reminder::from_document(&doc).unwrap_err();
        assert_eq!(err.issue, SchemaIssue::WrongType { expected: "string" });
    }

    #[test]
    fn draft_fields_round_trip_through_decoder() {
        let draft = ReminderDraft {
            title: " Doctor ".to_string(),
            note: Some("bring card".to_string()),
            trigger_time: NaiveDate::from_ymd_opt(2025, 5, 20)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
        };
        let doc = Document {
            id: DocumentId::new("r2"),
            fields: draft.to_fields(),
        };
        let reminder = Reminder::from_document(&doc).unwrap();
        assert_eq!(reminder.title, "Doctor");
        assert_eq!(reminder.note.as_deref(), Some("bring card"));
        assert_eq!(reminder.trigger_time, draft.trigger_time);
    }
}
