//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Flatten core results into plain envelopes the UI can render directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Timestamps cross the boundary as local wall-clock strings
//!   (`YYYY-MM-DDTHH:MM:SS`, dates as `YYYY-MM-DD`).
//! - An empty string from a validation/config call means success.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use taskmate_core::agenda::{Bucket, BucketReport};
use taskmate_core::collab::LocalObjectStorage;
use taskmate_core::db::open_db;
use taskmate_core::model::datetime::{
    format_date, format_date_time, parse_date, parse_date_time, parse_time,
};
use taskmate_core::validation;
use taskmate_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    suggest_time_of_day, Agenda, AppConfig, AppContext, Clock, DocumentId, Goal, GoalDraft,
    GoalEdit, GoalSchedule, GoalService, Priority, Reminder, ReminderDraft, ReminderService,
    Schedule, ServiceError, ServiceResult, SqliteDocumentStore, SystemClock, Task, TaskDraft,
    TaskService, TaskStatus, TaskTab, Theme, TimeFrame,
};

const FFI_DB_FILE_NAME: &str = "taskmate_ffi.sqlite3";
static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
static APP_CONTEXT: OnceLock<Mutex<AppContext>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), PathBuf::from(log_dir.trim()).as_path()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result of a create/update/delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created or changed record.
    pub id: Option<String>,
    /// Field-level or diagnostic message; empty on success.
    pub message: String,
}

impl ActionResponse {
    fn success(id: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: Some(id.into()),
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_result<T>(result: Result<T, String>, id: impl FnOnce(&T) -> String) -> Self {
        match result {
            Ok(value) => Self::success(id(&value)),
            Err(message) => Self::failure(message),
        }
    }
}

/// One row on the reminder or goal screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaItem {
    pub id: String,
    pub title: String,
    pub note: Option<String>,
    /// `missed|today|tomorrow|upcoming`.
    pub bucket: String,
    /// Instant the row is bucketed by.
    pub at: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaResponse {
    pub ok: bool,
    /// Rows in display order: today, tomorrow, upcoming, missed.
    pub items: Vec<AgendaItem>,
    /// Stored documents skipped because they did not decode.
    pub rejected: u32,
    /// True when the rows are built-in sample data.
    pub sample: bool,
    pub message: String,
}

impl AgendaResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            rejected: 0,
            sample: false,
            message: message.into(),
        }
    }
}

/// Reminders bucketed against the device clock.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_agenda() -> AgendaResponse {
    let result = with_store(|store| reminder_service(store).agenda());
    agenda_response(result, |reminder: &Reminder| AgendaItem {
        id: reminder.id.to_string(),
        title: reminder.title.clone(),
        note: reminder.note.clone(),
        bucket: String::new(),
        at: format_date_time(reminder.trigger_time),
        completed: false,
    })
}

/// Creates a reminder. `trigger_time` is a local date-time string.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_create(title: String, note: Option<String>, trigger_time: String) -> ActionResponse {
    let Some(trigger_time) = parse_date_time(&trigger_time) else {
        return ActionResponse::failure(format!("Invalid trigger time `{trigger_time}`."));
    };
    let draft = ReminderDraft {
        title,
        note,
        trigger_time,
    };
    let result = with_store(|store| reminder_service(store).create(&draft));
    ActionResponse::from_result(result, |reminder| reminder.id.to_string())
}

/// Calendar flow: reminder for a task on a future day (`YYYY-MM-DD`, `HH:MM`).
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_set_for_task(
    task_title: String,
    date: String,
    time: String,
    note: Option<String>,
) -> ActionResponse {
    let (Some(date), Some(time)) = (parse_date(&date), parse_time(&time)) else {
        return ActionResponse::failure("Invalid date or time.");
    };
    let result = with_store(|store| {
        reminder_service(store).set_for_task(&task_title, date, time, note.as_deref())
    });
    ActionResponse::from_result(result, |reminder| reminder.id.to_string())
}

/// Moves a reminder to `trigger_time` and replaces its note.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_update(id: String, note: Option<String>, trigger_time: String) -> ActionResponse {
    let Some(trigger_time) = parse_date_time(&trigger_time) else {
        return ActionResponse::failure(format!("Invalid trigger time `{trigger_time}`."));
    };
    let id = DocumentId::new(id);
    let result =
        with_store(|store| reminder_service(store).update(&id, note.as_deref(), trigger_time));
    ActionResponse::from_result(result, |reminder| reminder.id.to_string())
}

#[flutter_rust_bridge::frb(sync)]
pub fn reminder_delete(id: String) -> ActionResponse {
    let id = DocumentId::new(id);
    let result = with_store(|store| reminder_service(store).delete(&id));
    ActionResponse::from_result(result, |_| id.to_string())
}

/// Creates a goal from explicit picker dates.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_create(
    name: String,
    note: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> ActionResponse {
    let draft = GoalDraft {
        name,
        note,
        schedule: GoalSchedule::Dates {
            start: start_date,
            end: end_date,
        },
    };
    let result = with_store(|store| goal_service(store).create(&draft));
    ActionResponse::from_result(result, |goal| goal.id.to_string())
}

/// Creates a goal from a preset (`1_day|1_week|1_month|3_months`).
#[flutter_rust_bridge::frb(sync)]
pub fn goal_create_with_time_frame(
    name: String,
    note: Option<String>,
    start_date: String,
    time_frame: String,
) -> ActionResponse {
    let Some(time_frame) = TimeFrame::parse(&time_frame) else {
        return ActionResponse::failure(format!("Unknown time frame `{time_frame}`."));
    };
    let Some(start) = parse_date(&start_date) else {
        return ActionResponse::failure(format!("Invalid start date `{start_date}`."));
    };
    let draft = GoalDraft {
        name,
        note,
        schedule: GoalSchedule::Preset { start, time_frame },
    };
    let result = with_store(|store| goal_service(store).create(&draft));
    ActionResponse::from_result(result, |goal| goal.id.to_string())
}

/// Flips a goal's completion flag.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_toggle(id: String) -> ActionResponse {
    let id = DocumentId::new(id);
    let result = with_store(|store| {
        let service = goal_service(store);
        let goal = service
            .list()?
            .items
            .into_iter()
            .find(|goal| goal.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        service.toggle_completed(&goal)
    });
    ActionResponse::from_result(result, |goal| goal.id.to_string())
}

/// Saves the goal edit form. Dates are picker values as in `goal_create`.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_update(
    id: String,
    name: String,
    note: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    completed: bool,
) -> ActionResponse {
    let id = DocumentId::new(id);
    let edit = GoalEdit {
        name,
        note,
        start: start_date,
        end: end_date,
        completed,
    };
    let result = with_store(|store| goal_service(store).update(&id, &edit));
    ActionResponse::from_result(result, |goal| goal.id.to_string())
}

#[flutter_rust_bridge::frb(sync)]
pub fn goal_delete(id: String) -> ActionResponse {
    let id = DocumentId::new(id);
    let result = with_store(|store| goal_service(store).delete(&id));
    ActionResponse::from_result(result, |_| id.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalProgressResponse {
    pub ok: bool,
    pub completed: u32,
    pub total: u32,
    pub percent: u8,
    pub message: String,
}

/// Completed versus total goals for the progress ring.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_progress() -> GoalProgressResponse {
    match with_store(|store| goal_service(store).progress()) {
        Ok(progress) => GoalProgressResponse {
            ok: true,
            completed: to_u32(progress.completed),
            total: to_u32(progress.total),
            percent: progress.percent(),
            message: String::new(),
        },
        Err(message) => GoalProgressResponse {
            ok: false,
            completed: 0,
            total: 0,
            percent: 0,
            message,
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn goals_agenda() -> AgendaResponse {
    let result = with_store(|store| goal_service(store).agenda());
    agenda_response(result, |goal: &Goal| AgendaItem {
        id: goal.id.to_string(),
        title: goal.name.clone(),
        note: goal.note.clone(),
        bucket: String::new(),
        at: format_date(goal.end_date),
        completed: goal.completed,
    })
}

/// Creates a task without an image.
///
/// `priority` is `High|Medium|Low`, `schedule` is `Daily|Weekly|Monthly`;
/// both fall back to their defaults when absent.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    title: String,
    description: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    deadline: Option<String>,
    schedule: Option<String>,
) -> ActionResponse {
    let priority = match priority.as_deref().map(Priority::parse) {
        Some(Some(priority)) => priority,
        Some(None) => return ActionResponse::failure("Unknown priority."),
        None => Priority::default(),
    };
    let schedule = match schedule.as_deref().map(Schedule::parse) {
        Some(Some(schedule)) => schedule,
        Some(None) => return ActionResponse::failure("Unknown schedule."),
        None => Schedule::default(),
    };
    let deadline = match deadline.as_deref() {
        Some(raw) => match parse_date_time(raw) {
            Some(deadline) => Some(deadline),
            None => return ActionResponse::failure(format!("Invalid deadline `{raw}`.")),
        },
        None => None,
    };
    let draft = TaskDraft {
        title,
        description,
        priority,
        category,
        deadline,
        schedule,
        ..TaskDraft::default()
    };
    let result = with_store(|store| task_service(store).create(&draft, None));
    ActionResponse::from_result(result, |task| task.id.to_string())
}

/// One row on the task history screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub priority: String,
    pub category: String,
    pub deadline: Option<String>,
    pub status: String,
    pub schedule: String,
    pub skip_count: u32,
    /// `Morning|Afternoon|Evening` once the task has been skipped often.
    pub suggested_time: Option<String>,
}

impl From<&Task> for TaskItem {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            priority: task.priority.as_str().to_string(),
            category: task.category.clone(),
            deadline: task.deadline.map(format_date_time),
            status: task.status.as_str().to_string(),
            schedule: task.schedule.as_str().to_string(),
            skip_count: task.skip_count,
            suggested_time: suggest_time_of_day(task).map(|time| time.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Tasks whose title contains `text`, within a tab
/// (`View All|My Tasks|In-progress|Completed`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_search(text: String, tab: String) -> TaskListResponse {
    let Some(tab) = TaskTab::parse(&tab) else {
        return TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("Unknown tab `{tab}`."),
        };
    };
    match with_store(|store| task_service(store).search(&text, tab)) {
        Ok(tasks) => TaskListResponse {
            ok: true,
            items: tasks.iter().map(TaskItem::from).collect(),
            message: String::new(),
        },
        Err(message) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
    }
}

/// Moves a task to another column (`My Tasks|In-progress|Completed`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_set_status(id: String, status: String) -> ActionResponse {
    let Some(status) = TaskStatus::parse(&status) else {
        return ActionResponse::failure(format!("Unknown status `{status}`."));
    };
    let id = DocumentId::new(id);
    let result = with_store(|store| task_service(store).set_status(&id, status));
    ActionResponse::from_result(result, |task| task.id.to_string())
}

/// Counts one skip of a task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_skip(id: String) -> ActionResponse {
    let id = DocumentId::new(id);
    let result = with_store(|store| {
        let service = task_service(store);
        let task = service
            .list()?
            .items
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        service.record_skip(&task)
    });
    ActionResponse::from_result(result, |task| task.id.to_string())
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> ActionResponse {
    let id = DocumentId::new(id);
    let result = with_store(|store| task_service(store).delete(&id));
    ActionResponse::from_result(result, |_| id.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummaryResponse {
    pub ok: bool,
    pub total: u32,
    pub my_tasks: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub overdue: u32,
    pub message: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_summary() -> TaskSummaryResponse {
    match with_store(|store| task_service(store).summary()) {
        Ok(summary) => TaskSummaryResponse {
            ok: true,
            total: to_u32(summary.total),
            my_tasks: to_u32(summary.my_tasks),
            in_progress: to_u32(summary.in_progress),
            completed: to_u32(summary.completed),
            overdue: to_u32(summary.overdue),
            message: String::new(),
        },
        Err(message) => TaskSummaryResponse {
            ok: false,
            total: 0,
            my_tasks: 0,
            in_progress: 0,
            completed: 0,
            overdue: 0,
            message,
        },
    }
}

/// Empty string when `name` is a valid goal name, else the message to show.
#[flutter_rust_bridge::frb(sync)]
pub fn validate_goal_name(name: String) -> String {
    match validation::validate_goal_name(&name) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Empty string when the pair passes the goal date rules against today.
#[flutter_rust_bridge::frb(sync)]
pub fn validate_goal_dates(start_date: Option<String>, end_date: Option<String>) -> String {
    match validation::validate_goal_dates(
        start_date.as_deref(),
        end_date.as_deref(),
        clock().today(),
    ) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Current theme, `light` or `dark`.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_get() -> String {
    lock_context().theme().as_str().to_string()
}

/// Sets the theme; returns an error message for unknown names.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_set(theme: String) -> String {
    match Theme::parse(&theme) {
        Some(theme) => {
            lock_context().set_theme(theme);
            String::new()
        }
        None => format!("Unknown theme `{theme}`."),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn theme_toggle() -> String {
    lock_context().toggle_theme().as_str().to_string()
}

fn config() -> &'static AppConfig {
    APP_CONFIG.get_or_init(|| match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::warn!("event=ffi_config module=ffi status=fallback error={}", err);
            AppConfig::default()
        }
    })
}

fn lock_context() -> MutexGuard<'static, AppContext> {
    APP_CONTEXT
        .get_or_init(|| Mutex::new(AppContext::initialize(config())))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

fn resolve_db_path() -> PathBuf {
    let configured = &config().storage.db_path;
    if configured.is_absolute() {
        return configured.clone();
    }
    std::env::temp_dir().join(FFI_DB_FILE_NAME)
}

fn reminder_service<'a>(
    store: &'a SqliteDocumentStore<'a>,
) -> ReminderService<&'a SqliteDocumentStore<'a>> {
    ReminderService::from_config(store, clock(), config())
}

fn goal_service<'a>(store: &'a SqliteDocumentStore<'a>) -> GoalService<&'a SqliteDocumentStore<'a>> {
    GoalService::from_config(store, clock(), config())
}

fn task_service<'a>(
    store: &'a SqliteDocumentStore<'a>,
) -> TaskService<&'a SqliteDocumentStore<'a>, LocalObjectStorage> {
    let storage = LocalObjectStorage::new(config().storage.object_dir.clone());
    TaskService::from_config(store, storage, clock(), config())
}

fn to_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn with_store<T>(f: impl FnOnce(&SqliteDocumentStore<'_>) -> ServiceResult<T>) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("database open failed: {err}"))?;
    let store = SqliteDocumentStore::new(&conn);
    f(&store).map_err(|err| err.to_string())
}

fn agenda_response<T>(
    result: Result<Agenda<T>, String>,
    to_item: impl Fn(&T) -> AgendaItem,
) -> AgendaResponse {
    match result {
        Ok(agenda) => AgendaResponse {
            ok: true,
            items: agenda_items(&agenda.report, to_item),
            rejected: to_u32(agenda.schema_errors.len() + agenda.report.rejected.len()),
            sample: agenda.source.is_sample(),
            message: String::new(),
        },
        Err(message) => AgendaResponse::failure(message),
    }
}

fn agenda_items<T>(report: &BucketReport<T>, to_item: impl Fn(&T) -> AgendaItem) -> Vec<AgendaItem> {
    report
        .buckets
        .iter()
        .map(|(bucket, item): (Bucket, &T)| AgendaItem {
            bucket: bucket.as_str().to_string(),
            ..to_item(item)
        })
        .collect()
}
