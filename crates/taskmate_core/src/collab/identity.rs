//! Hosted identity service contract.

use super::CollabResult;
use serde::{Deserialize, Serialize};

/// Account profile as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Public URL of the uploaded avatar, if any.
    pub profile_picture: Option<String>,
}

/// Authenticated session handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
}

/// Third-party login providers offered on the sign-in screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

pub trait IdentityService {
    fn register(&self, email: &str, password: &str, name: &str) -> CollabResult<User>;

    fn login(&self, email: &str, password: &str) -> CollabResult<Session>;

    /// Returns `None` when no session is active.
    fn current_user(&self) -> CollabResult<Option<User>>;

    fn logout(&self) -> CollabResult<()>;

    /// Sends a recovery email; `redirect_url` is where the link lands.
    fn reset_password(&self, email: &str, redirect_url: &str) -> CollabResult<()>;

    /// Builds the browser URL that starts a third-party login.
    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        success_url: &str,
        failure_url: &str,
    ) -> CollabResult<String>;

    /// Stores the avatar URL in the account preferences.
    fn set_profile_picture(&self, url: &str) -> CollabResult<User>;
}

impl<T: IdentityService + ?Sized> IdentityService for &T {
    fn register(&self, email: &str, password: &str, name: &str) -> CollabResult<User> {
        (**self).register(email, password, name)
    }

    fn login(&self, email: &str, password: &str) -> CollabResult<Session> {
        (**self).login(email, password)
    }

    fn current_user(&self) -> CollabResult<Option<User>> {
        (**self).current_user()
    }

    fn logout(&self) -> CollabResult<()> {
        (**self).logout()
    }

    fn reset_password(&self, email: &str, redirect_url: &str) -> CollabResult<()> {
        (**self).reset_password(email, redirect_url)
    }

    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        success_url: &str,
        failure_url: &str,
    ) -> CollabResult<String> {
        (**self).oauth_authorize_url(provider, success_url, failure_url)
    }

    fn set_profile_picture(&self, url: &str) -> CollabResult<User> {
        (**self).set_profile_picture(url)
    }
}
