/// Database access layer
///
/// Each aggregate has a repository trait so services can be driven by the
/// Postgres implementations in production and by in-memory fakes in tests.
/// Relation inserts (likes, follows) use `ON CONFLICT DO NOTHING RETURNING`,
/// so `Ok(None)` means the row already existed.
use crate::models::{
    Comment, CommentWithUser, Follow, Like, NewPost, PageWindow, Post, PostWithStats, User,
    UserWithStats,
};
use async_trait::async_trait;
use uuid::Uuid;

pub mod comment_repo;
pub mod follow_repo;
pub mod like_repo;
pub mod post_repo;
pub mod user_repo;

pub use comment_repo::PgCommentRepository;
pub use follow_repo::PgFollowRepository;
pub use like_repo::PgLikeRepository;
pub use post_repo::PgPostRepository;
pub use user_repo::PgUserRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A foreign key pointed at a row that does not exist
    #[error("referenced row does not exist")]
    MissingReference,

    /// A check constraint rejected the row
    #[error("check constraint violated: {0}")]
    CheckViolation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Classify insert failures that callers need to tell apart.
pub(crate) fn classify_write_error(err: sqlx::Error) -> RepoError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return RepoError::MissingReference;
        }
        if db_err.is_check_violation() {
            return RepoError::CheckViolation(
                db_err.constraint().unwrap_or("unknown").to_string(),
            );
        }
    }
    RepoError::Database(err)
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>>;

    /// Insert the user, or refresh the display name if it already exists.
    async fn upsert(&self, external_id: &str, name: &str) -> RepoResult<User>;

    /// User joined with post/follower/following counts.
    async fn find_with_stats(&self, external_id: &str) -> RepoResult<Option<UserWithStats>>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Page of posts, newest first, decorated for `viewer`.
    async fn list(
        &self,
        window: PageWindow,
        owner: Option<Uuid>,
        viewer: Option<Uuid>,
    ) -> RepoResult<Vec<PostWithStats>>;

    async fn count(&self, owner: Option<Uuid>) -> RepoResult<i64>;

    async fn find_with_stats(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> RepoResult<Option<PostWithStats>>;

    async fn find(&self, post_id: Uuid) -> RepoResult<Option<Post>>;

    async fn insert(&self, post: NewPost) -> RepoResult<Post>;

    /// Returns false when no row was deleted.
    async fn delete(&self, post_id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// `Ok(None)` when the like already exists.
    async fn insert(&self, post_id: Uuid, user_id: Uuid) -> RepoResult<Option<Like>>;

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments oldest first. `None` returns every comment on the post.
    async fn list(
        &self,
        post_id: Uuid,
        window: Option<PageWindow>,
    ) -> RepoResult<Vec<CommentWithUser>>;

    async fn insert(&self, post_id: Uuid, user_id: Uuid, content: &str)
        -> RepoResult<CommentWithUser>;

    async fn find(&self, comment_id: Uuid) -> RepoResult<Option<Comment>>;

    async fn delete(&self, comment_id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// `Ok(None)` when the follow already exists.
    async fn insert(&self, follower_id: Uuid, following_id: Uuid) -> RepoResult<Option<Follow>>;

    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> RepoResult<bool>;

    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> RepoResult<bool>;
}
