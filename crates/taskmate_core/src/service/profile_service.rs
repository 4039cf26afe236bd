//! Profile picture updates.

use crate::collab::{IdentityService, ObjectStorage, User};
use crate::config::StorageConfig;
use crate::context::AppContext;
use crate::service::{ServiceError, ServiceResult};
use crate::validation::validate_required;
use log::info;

pub struct ProfileService<I: IdentityService, O: ObjectStorage> {
    identity: I,
    storage: O,
    bucket: String,
}

impl<I: IdentityService, O: ObjectStorage> ProfileService<I, O> {
    pub fn new(identity: I, storage: O, config: &StorageConfig) -> Self {
        Self {
            identity,
            storage,
            bucket: config.profile_bucket.clone(),
        }
    }

    /// Uploads the signed-in user's picture, stores its public URL on the
    /// account and refreshes `ctx`.
    ///
    /// # Errors
    /// - `InconsistentState` when nobody is signed in.
    /// - `Validation` when the file name is blank.
    pub fn update_profile_picture(
        &self,
        ctx: &mut AppContext,
        bytes: &[u8],
        file_name: &str,
    ) -> ServiceResult<User> {
        let user_id = ctx
            .current_user()
            .map(|user| user.id.clone())
            .ok_or_else(|| ServiceError::InconsistentState("no user is signed in".to_string()))?;
        let file_name = validate_required("File name", file_name)?;

        let file = self.storage.upload(&self.bucket, &user_id, bytes, file_name)?;
        let url = self.storage.public_url(&file.bucket, &file.id)?;
        let user = self.identity.set_profile_picture(&url)?;
        ctx.update_user(user.clone());
        info!(
            "event=profile_picture module=service status=ok user_id={} size={}",
            user.id, file.size
        );
        Ok(user)
    }
}
