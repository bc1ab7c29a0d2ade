use super::{RepoResult, UserRepository};
use crate::models::{User, UserWithStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserStatsRow {
    id: Uuid,
    external_id: String,
    name: String,
    created_at: DateTime<Utc>,
    posts_count: i64,
    followers_count: i64,
    following_count: i64,
}

impl From<UserStatsRow> for UserWithStats {
    fn from(row: UserStatsRow) -> Self {
        UserWithStats {
            user: User {
                id: row.id,
                external_id: row.external_id,
                name: row.name,
                created_at: row.created_at,
            },
            posts_count: row.posts_count,
            followers_count: row.followers_count,
            following_count: row.following_count,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, external_id, name, created_at
            FROM users
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn upsert(&self, external_id: &str, name: &str) -> RepoResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (external_id, name)
            VALUES ($1, $2)
            ON CONFLICT (external_id) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, external_id, name, created_at
            "#,
        )
        .bind(external_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_with_stats(&self, external_id: &str) -> RepoResult<Option<UserWithStats>> {
        let row = sqlx::query_as::<_, UserStatsRow>(
            r#"
            SELECT u.id, u.external_id, u.name, u.created_at,
                   s.posts_count, s.followers_count, s.following_count
            FROM users u
            JOIN user_stats s ON s.user_id = u.id
            WHERE u.external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserWithStats::from))
    }
}
