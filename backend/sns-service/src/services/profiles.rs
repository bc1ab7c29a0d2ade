use super::IdentityService;
use crate::db::FollowRepository;
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::models::Profile;
use std::sync::Arc;

#[derive(Clone)]
pub struct ProfileService {
    identity: IdentityService,
    follows: Arc<dyn FollowRepository>,
}

impl ProfileService {
    pub fn new(identity: IdentityService, follows: Arc<dyn FollowRepository>) -> Self {
        Self { identity, follows }
    }

    /// Profile of `subject` with the viewer's follow state.
    pub async fn get(&self, subject: &str, viewer: Option<&str>) -> Result<Profile> {
        let stats = self
            .identity
            .find_with_stats(subject)
            .await?
            .ok_or(AppError::NotFound(MessageKey::UserNotFound))?;

        let is_following = match viewer {
            Some(viewer) if viewer != subject => match self.identity.find(viewer).await? {
                Some(viewer) => self
                    .follows
                    .exists(viewer.id, stats.user.id)
                    .await
                    .map_err(|e| AppError::internal(MessageKey::InternalError, e))?,
                None => false,
            },
            _ => false,
        };

        Ok(Profile {
            stats,
            is_following,
        })
    }
}
