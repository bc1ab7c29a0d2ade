//! Post aggregation: pages of decorated posts and single-post lookups.

use super::IdentityService;
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::models::{PageWindow, PostPage, PostWithStats};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct FeedService {
    identity: IdentityService,
    posts: Arc<dyn PostRepository>,
}

impl FeedService {
    pub fn new(identity: IdentityService, posts: Arc<dyn PostRepository>) -> Self {
        Self { identity, posts }
    }

    /// Newest-first page of posts, optionally restricted to one author.
    ///
    /// An unknown author yields an empty page. A viewer without a user row is
    /// treated as anonymous.
    pub async fn list_posts(
        &self,
        window: PageWindow,
        author: Option<&str>,
        viewer: Option<&str>,
    ) -> Result<PostPage> {
        let owner = match author {
            Some(external_id) => match self.lookup(external_id).await? {
                Some(id) => Some(id),
                None => {
                    return Ok(PostPage {
                        data: Vec::new(),
                        meta: window.meta(0),
                    })
                }
            },
            None => None,
        };
        let viewer = self.viewer_id(viewer).await?;

        let data = self
            .posts
            .list(window, owner, viewer)
            .await
            .map_err(|e| AppError::internal(MessageKey::FetchPostsFailed, e))?;
        let total = self
            .posts
            .count(owner)
            .await
            .map_err(|e| AppError::internal(MessageKey::FetchPostsFailed, e))?;

        Ok(PostPage {
            data,
            meta: window.meta(total),
        })
    }

    pub async fn get_post(&self, post_id: Uuid, viewer: Option<&str>) -> Result<PostWithStats> {
        let viewer = self.viewer_id(viewer).await?;

        self.posts
            .find_with_stats(post_id, viewer)
            .await
            .map_err(|e| AppError::internal(MessageKey::FetchPostsFailed, e))?
            .ok_or(AppError::NotFound(MessageKey::PostNotFound))
    }

    async fn lookup(&self, external_id: &str) -> Result<Option<Uuid>> {
        self.identity
            .find(external_id)
            .await
            .map(|user| user.map(|u| u.id))
            .map_err(|e| match e {
                AppError::Internal { detail, .. } => {
                    AppError::internal(MessageKey::FetchPostsFailed, detail)
                }
                other => other,
            })
    }

    async fn viewer_id(&self, viewer: Option<&str>) -> Result<Option<Uuid>> {
        match viewer {
            Some(external_id) => self.lookup(external_id).await,
            None => Ok(None),
        }
    }
}
