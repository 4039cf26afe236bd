//! Typed application context.
//!
//! Holds the UI theme and the signed-in session. Created once at app start
//! from configuration and changed only through its setters.

use crate::collab::{Session, User};
use crate::config::AppConfig;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user: User,
    /// `None` when the session was restored from the identity service
    /// rather than opened by a login in this process.
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    theme: Theme,
    session: Option<UserSession>,
}

impl AppContext {
    pub fn initialize(config: &AppConfig) -> Self {
        info!(
            "event=context_init module=context status=ok theme={}",
            config.ui.theme.as_str()
        );
        Self {
            theme: config.ui.theme,
            session: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|active| &active.user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn set_session(&mut self, user: User, session: Option<Session>) {
        self.session = Some(UserSession { user, session });
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// Replaces the signed-in user's profile. Returns `false` when nobody is signed in.
    pub fn update_user(&mut self, user: User) -> bool {
        match self.session.as_mut() {
            Some(active) => {
                active.user = user;
                true
            }
            None => false,
        }
    }
}
