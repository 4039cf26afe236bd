//! Goal use-case service.
//!
//! # Invariants
//! - Created goals pass the full name rule and the date rules against today.
//! - Edits re-check the date rules; the name only has to be non-blank so
//!   goals created before the name rule existed stay editable.
//! - Completion toggles never touch dates.

use crate::clock::Clock;
use crate::collab::{Collection, DocumentId, DocumentQuery, DocumentStore, SortOrder};
use crate::config::AppConfig;
use crate::model::goal::{
    completion_fields, Goal, GoalRecord, TimeFrame, FIELD_COMPLETED, FIELD_END,
};
use crate::sample::sample_goals;
use crate::service::{
    decode_all, ensure_writable, Agenda, FetchOutcome, FetchPolicy, ServiceError, ServiceResult,
};
use crate::validation::{
    check_goal_date_range, validate_goal_dates, validate_goal_name, validate_required,
};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::sync::Arc;

/// How a new goal's dates are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalSchedule {
    /// Raw picker values, `YYYY-MM-DD` or ISO-8601 date-times.
    Dates {
        start: Option<String>,
        end: Option<String>,
    },
    /// Preset duration counted from `start`.
    Preset { start: NaiveDate, time_frame: TimeFrame },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    pub name: String,
    pub note: Option<String>,
    pub schedule: GoalSchedule,
}

/// Edit-form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalEdit {
    pub name: String,
    pub note: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalProgress {
    pub completed: usize,
    pub total: usize,
}

impl GoalProgress {
    /// Whole-number percentage; zero when there are no goals.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let percent = self.completed.saturating_mul(100) / self.total;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }
}

pub struct GoalService<S: DocumentStore> {
    store: S,
    clock: Arc<dyn Clock>,
    policy: FetchPolicy,
}

impl<S: DocumentStore> GoalService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: FetchPolicy::default(),
        }
    }

    pub fn from_config(store: S, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self::new(store, clock).with_policy(FetchPolicy::from_config(config))
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// All goals sorted by end date, then start date.
    pub fn list(&self) -> ServiceResult<FetchOutcome<Goal>> {
        let documents = match self.store.list(Collection::Goals, &DocumentQuery::all()) {
            Ok(documents) => documents,
            Err(err) if self.policy == FetchPolicy::FallbackToSample => {
                warn!("event=goal_list module=service status=fallback error={}", err);
                return Ok(FetchOutcome::sample(sample_goals(self.clock.today()), &err));
            }
            Err(err) => return Err(err.into()),
        };

        let (mut goals, rejected) = decode_all(&documents, Goal::from_document);
        goals.sort_by_key(|goal| (goal.end_date, goal.start_date));
        info!(
            "event=goal_list module=service status=ok count={} rejected={}",
            goals.len(),
            rejected.len()
        );
        Ok(FetchOutcome::live(goals, rejected))
    }

    /// The `limit` open goals ending soonest, for the home screen preview.
    ///
    /// Goals without a stored `Completed` flag are not matched.
    pub fn open_goals(&self, limit: u32) -> ServiceResult<FetchOutcome<Goal>> {
        let query = DocumentQuery::all()
            .filter_eq(FIELD_COMPLETED, false)
            .order_by(FIELD_END, SortOrder::Ascending)
            .limit(limit);
        let documents = match self.store.list(Collection::Goals, &query) {
            Ok(documents) => documents,
            Err(err) if self.policy == FetchPolicy::FallbackToSample => {
                warn!("event=goal_open module=service status=fallback error={}", err);
                let mut goals: Vec<Goal> = sample_goals(self.clock.today())
                    .into_iter()
                    .filter(|goal| !goal.completed)
                    .collect();
                goals.sort_by_key(|goal| goal.end_date);
                goals.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
                return Ok(FetchOutcome::sample(goals, &err));
            }
            Err(err) => return Err(err.into()),
        };

        let (goals, rejected) = decode_all(&documents, Goal::from_document);
        info!(
            "event=goal_open module=service status=ok count={} rejected={}",
            goals.len(),
            rejected.len()
        );
        Ok(FetchOutcome::live(goals, rejected))
    }

    /// # Errors
    /// - `Validation` for a bad name, missing or malformed dates, a start
    ///   before today, or an end not after the start.
    pub fn create(&self, draft: &GoalDraft) -> ServiceResult<Goal> {
        let name = validate_goal_name(&draft.name)?;
        let today = self.clock.today();
        let (start_date, end_date, time_frame) = match &draft.schedule {
            GoalSchedule::Dates { start, end } => {
                let (start, end) = validate_goal_dates(start.as_deref(), end.as_deref(), today)?;
                (start, end, None)
            }
            GoalSchedule::Preset { start, time_frame } => {
                let end = time_frame.end_date_from(*start).ok_or_else(|| {
                    ServiceError::InconsistentState(format!(
                        "time frame {} overflows the calendar",
                        time_frame.as_str()
                    ))
                })?;
                check_goal_date_range(*start, end, today)?;
                (*start, end, Some(*time_frame))
            }
        };

        let record = GoalRecord {
            name: name.to_string(),
            note: draft.note.clone(),
            start_date,
            end_date,
            completed: false,
            time_frame,
        };
        let document = self.store.create(Collection::Goals, record.to_fields())?;
        info!("event=goal_create module=service status=ok id={}", document.id);
        Ok(Goal::from_document(&document)?)
    }

    /// # Errors
    /// - `Validation` for a blank name or failing date rules.
    /// - `NotFound` when `id` does not exist.
    pub fn update(&self, id: &DocumentId, edit: &GoalEdit) -> ServiceResult<Goal> {
        ensure_writable(id)?;
        let name = validate_required("Goal name", &edit.name)?;
        let (start_date, end_date) =
            validate_goal_dates(edit.start.as_deref(), edit.end.as_deref(), self.clock.today())?;

        let record = GoalRecord {
            name: name.to_string(),
            note: edit.note.clone(),
            start_date,
            end_date,
            completed: edit.completed,
            time_frame: None,
        };
        let document = self.store.update(Collection::Goals, id, record.to_fields())?;
        info!("event=goal_update module=service status=ok id={}", id);
        Ok(Goal::from_document(&document)?)
    }

    /// Flips the completion flag of `goal` and returns the stored result.
    pub fn toggle_completed(&self, goal: &Goal) -> ServiceResult<Goal> {
        self.set_completed(&goal.id, !goal.completed)
    }

    pub fn set_completed(&self, id: &DocumentId, completed: bool) -> ServiceResult<Goal> {
        ensure_writable(id)?;
        let document = self
            .store
            .update(Collection::Goals, id, completion_fields(completed))?;
        info!(
            "event=goal_complete module=service status=ok id={} completed={}",
            id, completed
        );
        Ok(Goal::from_document(&document)?)
    }

    pub fn delete(&self, id: &DocumentId) -> ServiceResult<()> {
        ensure_writable(id)?;
        self.store.delete(Collection::Goals, id)?;
        info!("event=goal_delete module=service status=ok id={}", id);
        Ok(())
    }

    pub fn progress(&self) -> ServiceResult<GoalProgress> {
        let outcome = self.list()?;
        Ok(progress_of(&outcome.items))
    }

    pub fn agenda(&self) -> ServiceResult<Agenda<Goal>> {
        self.agenda_at(self.clock.now())
    }

    pub fn agenda_at(&self, now: NaiveDateTime) -> ServiceResult<Agenda<Goal>> {
        Ok(Agenda::from_outcome(self.list()?, now))
    }
}

pub fn progress_of(goals: &[Goal]) -> GoalProgress {
    GoalProgress {
        completed: goals.iter().filter(|goal| goal.completed).count(),
        total: goals.len(),
    }
}
