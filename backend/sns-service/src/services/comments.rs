//! Comment listing, creation and owner-only deletion.

use super::IdentityService;
use crate::db::{CommentRepository, RepoError};
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::models::{CommentWithUser, PageWindow};
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_COMMENT_CHARS: usize = 2200;

#[derive(Clone)]
pub struct CommentService {
    identity: IdentityService,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(identity: IdentityService, comments: Arc<dyn CommentRepository>) -> Self {
        Self { identity, comments }
    }

    /// Oldest first. The window applies only when `limit` is given.
    pub async fn list(
        &self,
        post_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<CommentWithUser>> {
        let window = limit.map(|limit| PageWindow::new(Some(limit), offset));

        self.comments
            .list(post_id, window)
            .await
            .map_err(|e| AppError::internal(MessageKey::FetchCommentsFailed, e))
    }

    pub async fn create(&self, caller: &str, post_id: Uuid, content: &str) -> Result<CommentWithUser> {
        let content = validate_content(content)?;
        let user = self.identity.resolve(caller).await?;

        self.comments
            .insert(post_id, user.id, content)
            .await
            .map_err(|e| match e {
                RepoError::MissingReference => AppError::NotFound(MessageKey::PostNotFound),
                e => AppError::internal(MessageKey::CreateCommentFailed, e),
            })
    }

    /// Only the author may delete; ownership compares internal ids.
    pub async fn delete(&self, caller: &str, comment_id: Uuid) -> Result<()> {
        let user = self.identity.resolve(caller).await?;

        let comment = self
            .comments
            .find(comment_id)
            .await
            .map_err(|e| AppError::internal(MessageKey::DeleteCommentFailed, e))?
            .ok_or(AppError::NotFound(MessageKey::CommentNotFound))?;

        if comment.user_id != user.id {
            tracing::warn!(%comment_id, caller_id = %user.id, "comment delete denied");
            return Err(AppError::Forbidden(MessageKey::CommentDeleteForbidden));
        }

        self.comments
            .delete(comment_id)
            .await
            .map_err(|e| AppError::internal(MessageKey::DeleteCommentFailed, e))?;
        Ok(())
    }
}

fn validate_content(content: &str) -> Result<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest(MessageKey::ContentRequired));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::BadRequest(MessageKey::ContentTooLong));
    }
    Ok(content)
}
