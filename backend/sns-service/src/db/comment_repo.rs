use super::{classify_write_error, CommentRepository, RepoResult};
use crate::models::{Comment, CommentWithUser, PageWindow, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_external_id: String,
    owner_name: String,
    owner_created_at: DateTime<Utc>,
}

impl From<CommentRow> for CommentWithUser {
    fn from(row: CommentRow) -> Self {
        CommentWithUser {
            comment: Comment {
                id: row.id,
                post_id: row.post_id,
                user_id: row.user_id,
                content: row.content,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            user: User {
                id: row.user_id,
                external_id: row.owner_external_id,
                name: row.owner_name,
                created_at: row.owner_created_at,
            },
        }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list(
        &self,
        post_id: Uuid,
        window: Option<PageWindow>,
    ) -> RepoResult<Vec<CommentWithUser>> {
        // NULL limit means no LIMIT in Postgres.
        let (limit, offset) = match window {
            Some(w) => (Some(w.limit), w.offset),
            None => (None, 0),
        };

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, c.updated_at,
                   u.external_id AS owner_external_id,
                   u.name AS owner_name,
                   u.created_at AS owner_created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentWithUser::from).collect())
    }

    async fn insert(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> RepoResult<CommentWithUser> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, user_id, content, created_at, updated_at
            )
            SELECT i.id, i.post_id, i.user_id, i.content, i.created_at, i.updated_at,
                   u.external_id AS owner_external_id,
                   u.name AS owner_name,
                   u.created_at AS owner_created_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;

        Ok(row.into())
    }

    async fn find(&self, comment_id: Uuid) -> RepoResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete(&self, comment_id: Uuid) -> RepoResult<bool> {
        let affected = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}
