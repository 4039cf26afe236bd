//! Application configuration.
//!
//! # Responsibility
//! - Load `AppConfig` from TOML with a default for every field.
//! - Apply `TASKMATE_*` environment overrides and reject unusable values.
//!
//! # Invariants
//! - A config returned by `load`/`from_toml_str` has passed `validate`.

use crate::context::Theme;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "TASKMATE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKMATE_LOG_LEVEL";

const MAX_NOTIFICATION_LEAD_MINUTES: i64 = 24 * 60;

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to write config `{}`: {source}", path.display())
            }
            Self::Parse(message) => write!(f, "invalid config TOML: {message}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Must be absolute.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: std::env::temp_dir().join("taskmate").join("logs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    /// Root of the directory-backed object storage.
    pub object_dir: PathBuf,
    pub profile_bucket: String,
    pub task_image_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("taskmate.sqlite3"),
            object_dir: PathBuf::from("taskmate-objects"),
            profile_bucket: "profile".to_string(),
            task_image_bucket: "task-images".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersConfig {
    pub notification_lead_minutes: i64,
    pub alarm_poll_interval_ms: u64,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            notification_lead_minutes: crate::agenda::DEFAULT_NOTIFICATION_LEAD_MINUTES,
            alarm_poll_interval_ms: 1000,
        }
    }
}

impl RemindersConfig {
    pub fn notification_lead(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::minutes(self.notification_lead_minutes)
    }

    pub fn alarm_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.alarm_poll_interval_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Serve the built-in sample reminders/goals when the store fails.
    pub fallback_to_sample_data: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub oauth_success_url: String,
    pub oauth_failure_url: String,
    pub password_reset_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            oauth_success_url: "taskmate://auth/success".to_string(),
            oauth_failure_url: "taskmate://auth/failure".to_string(),
            password_reset_url: "taskmate://auth/reset".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub reminders: RemindersConfig,
    pub data: DataConfig,
    pub ui: UiConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Reads `path`, applies environment overrides and validates.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for hosts without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates without consulting the environment.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|err| ConfigError::Parse(err.to_string()))?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides from `TASKMATE_DB_PATH` and `TASKMATE_LOG_LEVEL`; blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(db_path) = lookup(ENV_DB_PATH) {
            self.storage.db_path = PathBuf::from(db_path.trim());
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let lead = self.reminders.notification_lead_minutes;
        if !(0..=MAX_NOTIFICATION_LEAD_MINUTES).contains(&lead) {
            return Err(ConfigError::Invalid(format!(
                "reminders.notification_lead_minutes must be within 0..={MAX_NOTIFICATION_LEAD_MINUTES}, got {lead}"
            )));
        }
        if self.reminders.alarm_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "reminders.alarm_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.db_path cannot be empty".to_string()));
        }
        for (key, bucket) in [
            ("storage.profile_bucket", &self.storage.profile_bucket),
            ("storage.task_image_bucket", &self.storage.task_image_bucket),
        ] {
            if bucket.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} cannot be empty")));
            }
        }
        Ok(())
    }

    fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DB_PATH, ENV_LOG_LEVEL};
    use crate::context::Theme;
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.reminders.notification_lead_minutes, 30);
        assert_eq!(config.reminders.alarm_poll_interval_ms, 1000);
        assert!(!config.data.fallback_to_sample_data);
        assert_eq!(config.ui.theme, Theme::Light);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [reminders]
            notification_lead_minutes = 10

            [data]
            fallback_to_sample_data = true

            [ui]
            theme = "dark"
            "#,
        )
        .unwrap();
        assert_eq!(config.reminders.notification_lead_minutes, 10);
        assert_eq!(config.reminders.alarm_poll_interval_ms, 1000);
        assert!(config.data.fallback_to_sample_data);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.storage.profile_bucket, "profile");
    }

    #[test]
    fn rejects_zero_poll_interval_and_bad_toml() {
        let err = AppConfig::from_toml_str("[reminders]\nalarm_poll_interval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AppConfig::from_toml_str("[ui]\ntheme = \"neon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_replace_db_path_and_level() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            ENV_DB_PATH => Some("/data/tm.sqlite3".to_string()),
            ENV_LOG_LEVEL => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.storage.db_path, PathBuf::from("/data/tm.sqlite3"));
        assert_eq!(config.logging.level, AppConfig::default().logging.level);
    }

    #[test]
    fn save_then_load_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("taskmate.toml");
        let mut config = AppConfig::default();
        config.reminders.notification_lead_minutes = 45;
        config.save(&path).unwrap();

        let loaded = AppConfig::from_toml_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.reminders.notification_lead_minutes, 45);
    }
}
