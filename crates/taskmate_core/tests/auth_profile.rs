use std::cell::RefCell;
use taskmate_core::collab::{
    CollabResult, CollaboratorError, IdentityService, LocalObjectStorage, OAuthProvider, Session,
    User,
};
use taskmate_core::config::{AuthConfig, StorageConfig};
use taskmate_core::{
    AppContext, AuthService, ProfileService, ServiceError, ValidationError,
};

/// In-memory identity service with a single account slot.
#[derive(Default)]
struct FakeIdentity {
    accounts: RefCell<Vec<(User, String)>>,
    active: RefCell<Option<User>>,
    resets: RefCell<Vec<(String, String)>>,
    logout_fails: bool,
}

impl IdentityService for FakeIdentity {
    fn register(&self, email: &str, password: &str, name: &str) -> CollabResult<User> {
        let user = User {
            id: format!("user-{}", self.accounts.borrow().len() + 1),
            name: name.to_string(),
            email: email.to_string(),
            profile_picture: None,
        };
        self.accounts
            .borrow_mut()
            .push((user.clone(), password.to_string()));
        Ok(user)
    }

    fn login(&self, email: &str, password: &str) -> CollabResult<Session> {
        let accounts = self.accounts.borrow();
        let (user, _) = accounts
            .iter()
            .find(|(user, stored)| user.email == email && stored == password)
            .ok_or_else(|| CollaboratorError::Rejected("Invalid email or password.".into()))?;
        *self.active.borrow_mut() = Some(user.clone());
        Ok(Session {
            id: "session-1".to_string(),
            user_id: user.id.clone(),
        })
    }

    fn current_user(&self) -> CollabResult<Option<User>> {
        Ok(self.active.borrow().clone())
    }

    fn logout(&self) -> CollabResult<()> {
        if self.logout_fails {
            return Err(CollaboratorError::Unavailable("offline".into()));
        }
        *self.active.borrow_mut() = None;
        Ok(())
    }

    fn reset_password(&self, email: &str, redirect_url: &str) -> CollabResult<()> {
        self.resets
            .borrow_mut()
            .push((email.to_string(), redirect_url.to_string()));
        Ok(())
    }

    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        success_url: &str,
        failure_url: &str,
    ) -> CollabResult<String> {
        Ok(format!(
            "https://id.example/oauth/{}?success={success_url}&failure={failure_url}",
            provider.as_str()
        ))
    }

    fn set_profile_picture(&self, url: &str) -> CollabResult<User> {
        let mut active = self.active.borrow_mut();
        let user = active
            .as_mut()
            .ok_or_else(|| CollaboratorError::Rejected("no session".into()))?;
        user.profile_picture = Some(url.to_string());
        Ok(user.clone())
    }
}

#[test]
fn sign_up_validates_then_registers_without_signing_in() {
    let identity = FakeIdentity::default();
    let auth = AuthService::new(&identity, AuthConfig::default());

    assert!(matches!(
        auth.sign_up("", "ada@example.com", "pw"),
        Err(ServiceError::Validation(ValidationError::Required { field: "Name" }))
    ));
    assert!(matches!(
        auth.sign_up("Ada", "ada.example.com", "pw"),
        Err(ServiceError::Validation(ValidationError::InvalidEmail))
    ));
    assert!(identity.accounts.borrow().is_empty());

    let user = auth.sign_up("Ada", "ada@example.com", "secret").unwrap();
    assert_eq!(user.name, "Ada");
    assert!(identity.active.borrow().is_none());
}

#[test]
fn login_populates_context_and_logout_clears_it() {
    let identity = FakeIdentity::default();
    let auth = AuthService::new(&identity, AuthConfig::default());
    let mut ctx = AppContext::default();
    auth.sign_up("Ada", "ada@example.com", "secret").unwrap();

    assert!(matches!(
        auth.login(&mut ctx, "ada@example.com", "wrong"),
        Err(ServiceError::Collaborator(CollaboratorError::Rejected(_)))
    ));
    assert!(!ctx.is_signed_in());

    let user = auth.login(&mut ctx, "ada@example.com", "secret").unwrap();
    assert_eq!(ctx.current_user(), Some(&user));
    assert_eq!(
        ctx.session().and_then(|active| active.session.as_ref()).map(|s| s.id.as_str()),
        Some("session-1")
    );

    auth.logout(&mut ctx).unwrap();
    assert!(!ctx.is_signed_in());
}

#[test]
fn failed_logout_still_clears_local_session() {
    let identity = FakeIdentity {
        logout_fails: true,
        ..FakeIdentity::default()
    };
    let auth = AuthService::new(&identity, AuthConfig::default());
    let mut ctx = AppContext::default();
    auth.sign_up("Ada", "ada@example.com", "secret").unwrap();
    auth.login(&mut ctx, "ada@example.com", "secret").unwrap();

    assert!(auth.logout(&mut ctx).is_err());
    assert!(!ctx.is_signed_in());
}

#[test]
fn restore_reset_and_oauth_use_configured_urls() {
    let identity = FakeIdentity::default();
    let config = AuthConfig::default();
    let auth = AuthService::new(&identity, config.clone());
    let mut ctx = AppContext::default();

    assert_eq!(auth.restore_session(&mut ctx).unwrap(), None);
    auth.sign_up("Ada", "ada@example.com", "secret").unwrap();
    identity.login("ada@example.com", "secret").unwrap();
    let restored = auth.restore_session(&mut ctx).unwrap().unwrap();
    assert_eq!(ctx.current_user(), Some(&restored));

    assert!(matches!(
        auth.reset_password("  "),
        Err(ServiceError::Validation(ValidationError::Required { .. }))
    ));
    auth.reset_password("ada@example.com").unwrap();
    assert_eq!(
        identity.resets.borrow()[0],
        ("ada@example.com".to_string(), config.password_reset_url.clone())
    );

    let url = auth.oauth_url(OAuthProvider::Google).unwrap();
    assert!(url.contains("/google?"));
    assert!(url.contains(&config.oauth_success_url));
}

#[test]
fn profile_picture_requires_session_and_updates_context() {
    let identity = FakeIdentity::default();
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalObjectStorage::new(dir.path());
    let auth = AuthService::new(&identity, AuthConfig::default());
    let profile = ProfileService::new(&identity, &storage, &StorageConfig::default());
    let mut ctx = AppContext::default();

    assert!(matches!(
        profile.update_profile_picture(&mut ctx, b"img", "avatar.png"),
        Err(ServiceError::InconsistentState(_))
    ));

    auth.sign_up("Ada", "ada@example.com", "secret").unwrap();
    auth.login(&mut ctx, "ada@example.com", "secret").unwrap();
    let user = profile
        .update_profile_picture(&mut ctx, b"img", "avatar.png")
        .unwrap();

    let url = user.profile_picture.clone().unwrap();
    assert!(url.starts_with("file://"));
    assert!(url.ends_with("profile/user-1"));
    assert_eq!(ctx.current_user(), Some(&user));
}
