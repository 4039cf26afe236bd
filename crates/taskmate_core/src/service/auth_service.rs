//! Account use-case service.
//!
//! # Invariants
//! - Credentials are validated before the identity service is called.
//! - `AppContext` session state changes only after the identity service agrees,
//!   except logout, which always clears the local session.
//! - Emails and passwords never appear in log events.

use crate::collab::{IdentityService, OAuthProvider, User};
use crate::config::AuthConfig;
use crate::context::AppContext;
use crate::service::{ServiceError, ServiceResult};
use crate::validation::{validate_email, validate_required};
use log::{info, warn};

pub struct AuthService<I: IdentityService> {
    identity: I,
    urls: AuthConfig,
}

impl<I: IdentityService> AuthService<I> {
    pub fn new(identity: I, urls: AuthConfig) -> Self {
        Self { identity, urls }
    }

    /// Registers an account. The user still has to log in afterwards.
    ///
    /// # Errors
    /// - `Validation` when a field is blank or the email is malformed.
    pub fn sign_up(&self, name: &str, email: &str, password: &str) -> ServiceResult<User> {
        let name = validate_required("Name", name)?;
        let email = validate_required("Email", email)?;
        validate_required("Password", password)?;
        let email = validate_email(email)?;

        let user = self.identity.register(email, password, name)?;
        info!("event=auth_sign_up module=service status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Opens a session and stores it in `ctx`.
    ///
    /// # Errors
    /// - `Validation` for blank credentials.
    /// - `Collaborator` when the identity service rejects them.
    /// - `InconsistentState` when the service reports no user after login.
    pub fn login(&self, ctx: &mut AppContext, email: &str, password: &str) -> ServiceResult<User> {
        let email = validate_required("Email", email)?;
        validate_required("Password", password)?;

        let session = self.identity.login(email, password).map_err(|err| {
            warn!("event=auth_login module=service status=error error={}", err);
            err
        })?;
        let user = self.identity.current_user()?.ok_or_else(|| {
            ServiceError::InconsistentState("login succeeded but no user is active".to_string())
        })?;
        info!("event=auth_login module=service status=ok user_id={}", user.id);
        ctx.set_session(user.clone(), Some(session));
        Ok(user)
    }

    /// Ends the session. The local session is cleared even when the identity
    /// service call fails; that failure is still returned.
    pub fn logout(&self, ctx: &mut AppContext) -> ServiceResult<()> {
        let result = self.identity.logout();
        ctx.clear_session();
        match result {
            Ok(()) => {
                info!("event=auth_logout module=service status=ok");
                Ok(())
            }
            Err(err) => {
                warn!("event=auth_logout module=service status=error error={}", err);
                Err(err.into())
            }
        }
    }

    /// # Errors
    /// - `Validation` when the email is blank or malformed.
    pub fn reset_password(&self, email: &str) -> ServiceResult<()> {
        let email = validate_email(email)?;
        self.identity
            .reset_password(email, &self.urls.password_reset_url)?;
        info!("event=auth_reset module=service status=ok");
        Ok(())
    }

    /// Picks up an existing identity-service session at app start.
    pub fn restore_session(&self, ctx: &mut AppContext) -> ServiceResult<Option<User>> {
        let user = self.identity.current_user()?;
        match &user {
            Some(user) => {
                info!("event=auth_restore module=service status=ok user_id={}", user.id);
                ctx.set_session(user.clone(), None);
            }
            None => {
                info!("event=auth_restore module=service status=ok user_id=none");
                ctx.clear_session();
            }
        }
        Ok(user)
    }

    pub fn oauth_url(&self, provider: OAuthProvider) -> ServiceResult<String> {
        Ok(self.identity.oauth_authorize_url(
            provider,
            &self.urls.oauth_success_url,
            &self.urls.oauth_failure_url,
        )?)
    }
}
