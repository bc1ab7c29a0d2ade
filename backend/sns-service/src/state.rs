/// Shared request state: repositories, object storage and upload limits.
use crate::config::UploadConfig;
use crate::db::{
    CommentRepository, FollowRepository, LikeRepository, PgCommentRepository,
    PgFollowRepository, PgLikeRepository, PgPostRepository, PgUserRepository, PostRepository,
    UserRepository,
};
use crate::services::{
    CommentService, FeedService, IdentityService, InteractionService, MediaService,
    ProfileService,
};
use crate::storage::ObjectStorage;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub upload: UploadConfig,
}

impl AppState {
    /// Postgres-backed state for the running service.
    pub fn postgres(pool: PgPool, storage: Arc<dyn ObjectStorage>, upload: UploadConfig) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            likes: Arc::new(PgLikeRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool)),
            storage,
            upload,
        }
    }

    pub fn identity(&self) -> IdentityService {
        IdentityService::new(self.users.clone())
    }

    pub fn feed(&self) -> FeedService {
        FeedService::new(self.identity(), self.posts.clone())
    }

    pub fn interactions(&self) -> InteractionService {
        InteractionService::new(self.identity(), self.likes.clone(), self.follows.clone())
    }

    pub fn comment_store(&self) -> CommentService {
        CommentService::new(self.identity(), self.comments.clone())
    }

    pub fn media(&self) -> MediaService {
        MediaService::new(
            self.identity(),
            self.posts.clone(),
            self.storage.clone(),
            self.upload,
        )
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.identity(), self.follows.clone())
    }
}
