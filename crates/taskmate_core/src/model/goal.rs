//! Goal view model.
//!
//! # Invariants
//! - `end_date > start_date` for goals created or edited through the services
//!   (the store itself does not enforce this).
//! - Bucketing uses the start of `end_date`; completed goals are never missed.
//!   An incomplete goal ending today is therefore `missed` for the whole day
//!   except at exactly midnight, when it sits in `today`.

use crate::agenda::{Bucketable, TimestampError};
use crate::collab::{Collection, Document, DocumentId, Fields};
use crate::model::datetime::{format_date, parse_date};
use crate::model::normalize_note;
use crate::model::schema::{FieldReader, SchemaError, SchemaIssue};
use chrono::{Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

pub(crate) const FIELD_NAME: &str = "GoalName";
pub(crate) const FIELD_NOTE: &str = "GoalNote";
pub(crate) const FIELD_START: &str = "Start_Date";
pub(crate) const FIELD_END: &str = "End_Date";
pub(crate) const FIELD_COMPLETED: &str = "Completed";
pub(crate) const FIELD_TIME_FRAME: &str = "TimeFrame";

/// Preset durations offered on the goal setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrame {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 4] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1_day",
            Self::OneWeek => "1_week",
            Self::OneMonth => "1_month",
            Self::ThreeMonths => "3_months",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|frame| frame.as_str() == value.trim())
    }

    /// End date for a goal starting on `start`. `None` only past the calendar range.
    pub fn end_date_from(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::OneDay => start.checked_add_days(Days::new(1)),
            Self::OneWeek => start.checked_add_days(Days::new(7)),
            Self::OneMonth => start.checked_add_months(Months::new(1)),
            Self::ThreeMonths => start.checked_add_months(Months::new(3)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub id: DocumentId,
    pub name: String,
    pub note: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub completed: bool,
    pub time_frame: Option<TimeFrame>,
}

impl Goal {
    /// Decodes a `goals` document.
    ///
    /// `Completed` defaults to `false` when absent.
    pub fn from_document(doc: &Document) -> Result<Self, SchemaError> {
        let reader = FieldReader::new(Collection::Goals, doc);
        let name = reader.required_text(FIELD_NAME)?;
        let start_raw = reader.required_str(FIELD_START)?;
        let start_date = reader.parse(FIELD_START, start_raw, parse_date)?;
        let end_raw = reader.required_str(FIELD_END)?;
        let end_date = reader.parse(FIELD_END, end_raw, parse_date)?;
        let time_frame = match reader.optional_str(FIELD_TIME_FRAME)? {
            Some(raw) if !raw.trim().is_empty() => Some(TimeFrame::parse(raw).ok_or_else(|| {
                reader.error(
                    FIELD_TIME_FRAME,
                    SchemaIssue::Invalid(format!("unknown time frame `{raw}`")),
                )
            })?),
            _ => None,
        };

        Ok(Self {
            id: doc.id.clone(),
            name: name.trim().to_string(),
            note: normalize_note(reader.optional_str(FIELD_NOTE)?),
            start_date,
            end_date,
            completed: reader.optional_bool(FIELD_COMPLETED)?.unwrap_or(false),
            time_frame,
        })
    }

    /// Instant the goal is due: the start of its end date.
    pub fn end_instant(&self) -> NaiveDateTime {
        self.end_date.and_time(NaiveTime::MIN)
    }
}

impl Bucketable for Goal {
    fn bucket_instant(&self) -> Result<NaiveDateTime, TimestampError> {
        Ok(self.end_instant())
    }

    fn missed_eligible(&self) -> bool {
        !self.completed
    }
}

/// Validated goal contents ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalRecord {
    pub name: String,
    pub note: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub completed: bool,
    pub time_frame: Option<TimeFrame>,
}

impl GoalRecord {
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_NAME.to_string(), Value::String(self.name.trim().to_string()));
        fields.insert(
            FIELD_NOTE.to_string(),
            Value::String(self.note.as_deref().unwrap_or_default().trim().to_string()),
        );
        fields.insert(
            FIELD_START.to_string(),
            Value::String(format_date(self.start_date)),
        );
        fields.insert(FIELD_END.to_string(), Value::String(format_date(self.end_date)));
        fields.insert(FIELD_COMPLETED.to_string(), Value::Bool(self.completed));
        // Null rather than absent so a merge update clears a stale preset.
        fields.insert(
            FIELD_TIME_FRAME.to_string(),
            self.time_frame
                .map_or(Value::Null, |frame| Value::String(frame.as_str().to_string())),
        );
        fields
    }
}

/// Fields written when only the completion flag changes.
pub(crate) fn completion_fields(completed: bool) -> Fields {
    let mut fields = Fields::new();
    fields.insert(FIELD_COMPLETED.to_string(), Value::Bool(completed));
    fields
}
