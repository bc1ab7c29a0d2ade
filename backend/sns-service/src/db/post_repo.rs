//! Post queries.
//!
//! Decoration happens in SQL: one statement returns the page with owner,
//! like/comment counts from the `post_stats` view and the viewer's like flag,
//! and one counts the total.

use super::{classify_write_error, PostRepository, RepoResult};
use crate::models::{NewPost, PageWindow, Post, PostWithStats, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const DECORATED_POST_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.image_url, p.caption, p.created_at, p.updated_at,
           u.external_id AS owner_external_id,
           u.name AS owner_name,
           u.created_at AS owner_created_at,
           ps.likes_count,
           ps.comments_count,
           ($1::uuid IS NOT NULL AND EXISTS (
               SELECT 1 FROM likes vl WHERE vl.post_id = p.id AND vl.user_id = $1
           )) AS is_liked
    FROM posts p
    JOIN users u ON u.id = p.user_id
    JOIN post_stats ps ON ps.post_id = p.id
"#;

#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DecoratedPostRow {
    id: Uuid,
    user_id: Uuid,
    image_url: String,
    caption: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_external_id: String,
    owner_name: String,
    owner_created_at: DateTime<Utc>,
    likes_count: i64,
    comments_count: i64,
    is_liked: bool,
}

impl From<DecoratedPostRow> for PostWithStats {
    fn from(row: DecoratedPostRow) -> Self {
        PostWithStats {
            post: Post {
                id: row.id,
                user_id: row.user_id,
                image_url: row.image_url,
                caption: row.caption,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            user: User {
                id: row.user_id,
                external_id: row.owner_external_id,
                name: row.owner_name,
                created_at: row.owner_created_at,
            },
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            is_liked: row.is_liked,
        }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn list(
        &self,
        window: PageWindow,
        owner: Option<Uuid>,
        viewer: Option<Uuid>,
    ) -> RepoResult<Vec<PostWithStats>> {
        let sql = format!(
            "{DECORATED_POST_SELECT}
            WHERE ($2::uuid IS NULL OR p.user_id = $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query_as::<_, DecoratedPostRow>(&sql)
            .bind(viewer)
            .bind(owner)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PostWithStats::from).collect())
    }

    async fn count(&self, owner: Option<Uuid>) -> RepoResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn find_with_stats(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> RepoResult<Option<PostWithStats>> {
        let sql = format!("{DECORATED_POST_SELECT} WHERE p.id = $2");

        let row = sqlx::query_as::<_, DecoratedPostRow>(&sql)
            .bind(viewer)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PostWithStats::from))
    }

    async fn find(&self, post_id: Uuid) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, image_url, caption, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn insert(&self, post: NewPost) -> RepoResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, image_url, caption)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, image_url, caption, created_at, updated_at
            "#,
        )
        .bind(post.user_id)
        .bind(&post.image_url)
        .bind(&post.caption)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)
    }

    async fn delete(&self, post_id: Uuid) -> RepoResult<bool> {
        let affected = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}
