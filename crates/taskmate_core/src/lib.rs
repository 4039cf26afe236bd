//! Core domain logic for TaskMate.
//! This crate is the single source of truth for reminder, goal and task
//! invariants; UI shells reach it through `taskmate_ffi`.

pub mod agenda;
pub mod clock;
pub mod collab;
pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sample;
pub mod service;
pub mod validation;

pub use agenda::{bucketize, Bucket, BucketReport, Bucketable, Buckets};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collab::{CollaboratorError, DocumentId, DocumentStore};
pub use config::{AppConfig, ConfigError};
pub use context::{AppContext, Theme};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::goal::{Goal, TimeFrame};
pub use model::reminder::{Reminder, ReminderDraft};
pub use model::task::{
    suggest_time_of_day, Priority, Schedule, Task, TaskDraft, TaskStatus, TimeOfDay,
};
pub use repo::SqliteDocumentStore;
pub use service::auth_service::AuthService;
pub use service::goal_service::{GoalDraft, GoalEdit, GoalSchedule, GoalService};
pub use service::profile_service::ProfileService;
pub use service::reminder_service::ReminderService;
pub use service::task_service::{TaskService, TaskTab};
pub use service::{Agenda, DataSource, FetchOutcome, FetchPolicy, ServiceError, ServiceResult};
pub use validation::ValidationError;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
