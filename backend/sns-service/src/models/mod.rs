/// Data models for the SNS service
///
/// Row types map 1:1 onto the tables in `migrations/`. The `*With*` types are
/// the decorated shapes the API returns.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod pagination;

pub use pagination::{PageMeta, PageWindow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    /// Identity-provider subject
    pub external_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post decorated with its owner, counts and the viewer's like state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithStats {
    #[serde(flatten)]
    pub post: Post,
    pub user: User,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentWithUser {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithStats {
    #[serde(flatten)]
    pub user: User,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

/// Profile as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub stats: UserWithStats,
    pub is_following: bool,
}

/// A page of posts plus its window metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub data: Vec<PostWithStats>,
    pub meta: PageMeta,
}

/// Validated input for a new post row.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
}
