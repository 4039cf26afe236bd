//! Task use-case service.
//!
//! # Responsibility
//! - Create, edit and delete tasks, attaching an optional image through
//!   object storage.
//! - Filter the task list for the history screens and summarize it.
//!
//! # Invariants
//! - New tasks have a non-blank title and a deadline; a `Daily` deadline is
//!   not before now.
//! - A failed image upload never blocks task creation; the task is stored
//!   without an image.

use crate::clock::Clock;
use crate::collab::{Collection, DocumentId, DocumentQuery, DocumentStore, ObjectStorage};
use crate::config::AppConfig;
use crate::model::task::{
    skip_count_fields, status_fields, suggest_time_of_day, Schedule, Task, TaskDraft, TaskStatus,
    TimeOfDay,
};
use crate::service::{decode_all, Agenda, FetchOutcome, ServiceResult};
use crate::validation::{validate_not_past, validate_required, ValidationError};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_TASK_IMAGE_BUCKET: &str = "task-images";

/// Tabs on the task history screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskTab {
    #[default]
    ViewAll,
    MyTasks,
    InProgress,
    Completed,
}

impl TaskTab {
    pub const ALL: [TaskTab; 4] = [Self::ViewAll, Self::MyTasks, Self::InProgress, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewAll => "View All",
            Self::MyTasks => TaskStatus::MyTasks.as_str(),
            Self::InProgress => TaskStatus::InProgress.as_str(),
            Self::Completed => TaskStatus::Completed.as_str(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.as_str() == value.trim())
    }

    fn admits(self, status: TaskStatus) -> bool {
        match self {
            Self::ViewAll => true,
            Self::MyTasks => status == TaskStatus::MyTasks,
            Self::InProgress => status == TaskStatus::InProgress,
            Self::Completed => status == TaskStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSummary {
    pub total: usize,
    pub my_tasks: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Not completed and past their deadline.
    pub overdue: usize,
}

/// Image picked on the add-task screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

pub struct TaskService<S: DocumentStore, O: ObjectStorage> {
    store: S,
    storage: O,
    clock: Arc<dyn Clock>,
    image_bucket: String,
}

impl<S: DocumentStore, O: ObjectStorage> TaskService<S, O> {
    pub fn new(store: S, storage: O, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            storage,
            clock,
            image_bucket: DEFAULT_TASK_IMAGE_BUCKET.to_string(),
        }
    }

    pub fn from_config(store: S, storage: O, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        let mut service = Self::new(store, storage, clock);
        service.image_bucket = config.storage.task_image_bucket.clone();
        service
    }

    /// All tasks in creation order. Undecodable documents are reported in `rejected`.
    pub fn list(&self) -> ServiceResult<FetchOutcome<Task>> {
        let documents = self.store.list(Collection::Tasks, &DocumentQuery::all())?;
        let (tasks, rejected) = decode_all(&documents, Task::from_document);
        info!(
            "event=task_list module=service status=ok count={} rejected={}",
            tasks.len(),
            rejected.len()
        );
        Ok(FetchOutcome::live(tasks, rejected))
    }

    /// # Errors
    /// - `Validation` when the title is blank, the deadline is missing, or a
    ///   `Daily` deadline is past.
    pub fn create(&self, draft: &TaskDraft, image: Option<&TaskImage>) -> ServiceResult<Task> {
        validate_required("Title", &draft.title)?;
        let deadline = draft
            .deadline
            .ok_or(ValidationError::Required { field: "Deadline" })?;
        if draft.schedule == Schedule::Daily {
            validate_not_past("Deadline", deadline, self.clock.now())?;
        }

        let image_id = image.and_then(|image| self.upload_image(image));
        let document = self
            .store
            .create(Collection::Tasks, draft.to_fields(image_id.as_deref()))?;
        info!(
            "event=task_create module=service status=ok id={} has_image={}",
            document.id,
            image_id.is_some()
        );
        Ok(Task::from_document(&document)?)
    }

    /// Replaces the editable fields of a task; an attached image is kept.
    ///
    /// # Errors
    /// - `Validation` when the title is blank.
    /// - `NotFound` when `id` does not exist.
    pub fn update(&self, id: &DocumentId, draft: &TaskDraft) -> ServiceResult<Task> {
        validate_required("Title", &draft.title)?;
        let document = self.store.update(Collection::Tasks, id, draft.to_fields(None))?;
        info!("event=task_update module=service status=ok id={}", id);
        Ok(Task::from_document(&document)?)
    }

    pub fn set_status(&self, id: &DocumentId, status: TaskStatus) -> ServiceResult<Task> {
        let document = self.store.update(Collection::Tasks, id, status_fields(status))?;
        info!(
            "event=task_status module=service status=ok id={} task_status={}",
            id,
            status.as_str()
        );
        Ok(Task::from_document(&document)?)
    }

    /// Counts one more skip of `task` and returns the stored result.
    pub fn record_skip(&self, task: &Task) -> ServiceResult<Task> {
        let skip_count = task.skip_count.saturating_add(1);
        let document = self
            .store
            .update(Collection::Tasks, &task.id, skip_count_fields(skip_count))?;
        info!(
            "event=task_skip module=service status=ok id={} skip_count={}",
            task.id, skip_count
        );
        Ok(Task::from_document(&document)?)
    }

    /// Suggested time of day for a task the user keeps skipping.
    pub fn suggest_time(&self, task: &Task) -> Option<TimeOfDay> {
        suggest_time_of_day(task)
    }

    pub fn delete(&self, id: &DocumentId) -> ServiceResult<()> {
        self.store.delete(Collection::Tasks, id)?;
        info!("event=task_delete module=service status=ok id={}", id);
        Ok(())
    }

    /// Tasks whose title contains `text` (any case) and whose status fits `tab`.
    pub fn search(&self, text: &str, tab: TaskTab) -> ServiceResult<Vec<Task>> {
        let outcome = self.list()?;
        Ok(filter_tasks(&outcome.items, text, tab)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn summary(&self) -> ServiceResult<TaskSummary> {
        let outcome = self.list()?;
        Ok(summarize(&outcome.items, self.clock.now()))
    }

    /// Tasks bucketed by deadline. Tasks without a deadline are reported as rejected.
    pub fn agenda_at(&self, now: NaiveDateTime) -> ServiceResult<Agenda<Task>> {
        Ok(Agenda::from_outcome(self.list()?, now))
    }

    pub fn image_url(&self, task: &Task) -> ServiceResult<Option<String>> {
        match task.image.as_deref() {
            Some(image) => Ok(Some(self.storage.public_url(&self.image_bucket, image)?)),
            None => Ok(None),
        }
    }

    fn upload_image(&self, image: &TaskImage) -> Option<String> {
        let id = Uuid::new_v4().to_string();
        match self
            .storage
            .upload(&self.image_bucket, &id, &image.bytes, &image.file_name)
        {
            Ok(file) => Some(file.id),
            Err(err) => {
                warn!(
                    "event=task_image_upload module=service status=error error={}",
                    err
                );
                None
            }
        }
    }
}

pub fn filter_tasks<'a>(tasks: &'a [Task], text: &str, tab: TaskTab) -> Vec<&'a Task> {
    let needle = text.trim().to_lowercase();
    tasks
        .iter()
        .filter(|task| tab.admits(task.status))
        .filter(|task| needle.is_empty() || task.title.to_lowercase().contains(&needle))
        .collect()
}

pub fn summarize(tasks: &[Task], now: NaiveDateTime) -> TaskSummary {
    let mut summary = TaskSummary {
        total: tasks.len(),
        ..TaskSummary::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::MyTasks => summary.my_tasks += 1,
            TaskStatus::InProgress => summary.in_progress += 1,
            TaskStatus::Completed => summary.completed += 1,
        }
        if !task.is_completed() && task.deadline.is_some_and(|deadline| deadline < now) {
            summary.overdue += 1;
        }
    }
    summary
}
