//! Like and follow toggles.
//!
//! Adds rely on the unique constraint: an insert that returns no row means the
//! relation already existed and is reported as a conflict. Removes always
//! succeed, whether or not a row was deleted.

use super::IdentityService;
use crate::db::{FollowRepository, LikeRepository, RepoError};
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::metrics::record_toggle;
use crate::models::{Follow, Like};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct InteractionService {
    identity: IdentityService,
    likes: Arc<dyn LikeRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl InteractionService {
    pub fn new(
        identity: IdentityService,
        likes: Arc<dyn LikeRepository>,
        follows: Arc<dyn FollowRepository>,
    ) -> Self {
        Self {
            identity,
            likes,
            follows,
        }
    }

    pub async fn like(&self, caller: &str, post_id: Uuid) -> Result<Like> {
        let user = self.identity.resolve(caller).await?;

        match self.likes.insert(post_id, user.id).await {
            Ok(Some(like)) => {
                record_toggle("like", "add", "created");
                tracing::debug!(%post_id, user_id = %user.id, "post liked");
                Ok(like)
            }
            Ok(None) => {
                record_toggle("like", "add", "conflict");
                Err(AppError::Conflict(MessageKey::AlreadyLiked))
            }
            Err(RepoError::MissingReference) => {
                record_toggle("like", "add", "missing");
                Err(AppError::NotFound(MessageKey::PostNotFound))
            }
            Err(e) => {
                record_toggle("like", "add", "error");
                Err(AppError::internal(MessageKey::CreateLikeFailed, e))
            }
        }
    }

    pub async fn unlike(&self, caller: &str, post_id: Uuid) -> Result<()> {
        let user = self.identity.resolve(caller).await?;

        let removed = self
            .likes
            .delete(post_id, user.id)
            .await
            .map_err(|e| AppError::internal(MessageKey::DeleteLikeFailed, e))?;

        record_toggle("like", "remove", if removed { "deleted" } else { "noop" });
        Ok(())
    }

    /// Follow `target` (external id). Self-follow is rejected before any
    /// lookup.
    pub async fn follow(&self, caller: &str, target: &str) -> Result<Follow> {
        if caller == target {
            record_toggle("follow", "add", "self");
            return Err(AppError::BadRequest(MessageKey::CannotFollowSelf));
        }

        let follower = self.identity.resolve(caller).await?;
        let following = self
            .identity
            .find(target)
            .await?
            .ok_or(AppError::NotFound(MessageKey::FollowTargetNotFound))?;

        match self.follows.insert(follower.id, following.id).await {
            Ok(Some(follow)) => {
                record_toggle("follow", "add", "created");
                tracing::debug!(follower_id = %follower.id, following_id = %following.id, "user followed");
                Ok(follow)
            }
            Ok(None) => {
                record_toggle("follow", "add", "conflict");
                Err(AppError::Conflict(MessageKey::AlreadyFollowing))
            }
            Err(RepoError::CheckViolation(_)) => {
                record_toggle("follow", "add", "self");
                Err(AppError::BadRequest(MessageKey::CannotFollowSelf))
            }
            Err(RepoError::MissingReference) => {
                record_toggle("follow", "add", "missing");
                Err(AppError::NotFound(MessageKey::FollowTargetNotFound))
            }
            Err(e) => {
                record_toggle("follow", "add", "error");
                Err(AppError::internal(MessageKey::CreateFollowFailed, e))
            }
        }
    }

    pub async fn unfollow(&self, caller: &str, target: &str) -> Result<()> {
        let follower = self.identity.resolve(caller).await?;
        let following = self
            .identity
            .find(target)
            .await?
            .ok_or(AppError::NotFound(MessageKey::UnfollowTargetNotFound))?;

        let removed = self
            .follows
            .delete(follower.id, following.id)
            .await
            .map_err(|e| AppError::internal(MessageKey::DeleteFollowFailed, e))?;

        record_toggle("follow", "remove", if removed { "deleted" } else { "noop" });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{RepoResult, UserRepository};
    use crate::metrics::TOGGLE_TOTAL;
    use crate::models::{User, UserWithStats};
    use async_trait::async_trait;
    use chrono::Utc;

    /// Every lookup finds a user; every relation insert hits a deleted row.
    struct VanishingRows;

    fn user(external_id: &str) -> User {
        User {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            name: external_id.to_string(),
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl UserRepository for VanishingRows {
        async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>> {
            Ok(Some(user(external_id)))
        }

        async fn upsert(&self, external_id: &str, _name: &str) -> RepoResult<User> {
            Ok(user(external_id))
        }

        async fn find_with_stats(&self, _external_id: &str) -> RepoResult<Option<UserWithStats>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl LikeRepository for VanishingRows {
        async fn insert(&self, _post_id: Uuid, _user_id: Uuid) -> RepoResult<Option<Like>> {
            Err(RepoError::MissingReference)
        }

        async fn delete(&self, _post_id: Uuid, _user_id: Uuid) -> RepoResult<bool> {
            Ok(false)
        }
    }

    #[async_trait]
    impl FollowRepository for VanishingRows {
        async fn insert(&self, _follower: Uuid, _following: Uuid) -> RepoResult<Option<Follow>> {
            Err(RepoError::MissingReference)
        }

        async fn delete(&self, _follower: Uuid, _following: Uuid) -> RepoResult<bool> {
            Ok(false)
        }

        async fn exists(&self, _follower: Uuid, _following: Uuid) -> RepoResult<bool> {
            Ok(false)
        }
    }

    fn service() -> InteractionService {
        let rows = Arc::new(VanishingRows);
        InteractionService::new(IdentityService::new(rows.clone()), rows.clone(), rows)
    }

    fn missing_count(relation: &str) -> u64 {
        TOGGLE_TOTAL
            .with_label_values(&[relation, "add", "missing"])
            .get()
    }

    #[actix_rt::test]
    async fn test_like_on_missing_post_is_counted() {
        let before = missing_count("like");

        let err = service()
            .like("user_bob", Uuid::new_v4())
            .await
            .unwrap_err();

        assert_eq!(err.message(), MessageKey::PostNotFound);
        assert!(missing_count("like") > before);
    }

    #[actix_rt::test]
    async fn test_follow_of_vanished_user_is_counted() {
        let before = missing_count("follow");

        let err = service().follow("user_bob", "user_alice").await.unwrap_err();

        assert_eq!(err.message(), MessageKey::FollowTargetNotFound);
        assert!(missing_count("follow") > before);
    }
}
