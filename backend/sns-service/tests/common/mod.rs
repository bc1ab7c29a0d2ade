//! In-memory repositories, a recording object store and request helpers
//! shared by the HTTP tests.

#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use identity_jwt::{Claims, TokenVerifier};
use jsonwebtoken::{encode, EncodingKey, Header};
use s3_utils::S3Error;
use sns_service::config::UploadConfig;
use sns_service::db::{
    CommentRepository, FollowRepository, LikeRepository, PostRepository, RepoError, RepoResult,
    UserRepository,
};
use sns_service::handlers;
use sns_service::models::{
    Comment, CommentWithUser, Follow, Like, NewPost, PageWindow, Post, PostWithStats, User,
    UserWithStats,
};
use sns_service::storage::ObjectStorage;
use sns_service::AppState;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_SECRET: &[u8] = b"local-development-secret-0123456789";
pub const PUBLIC_BASE_URL: &str = "https://cdn.test/uploads";

// =====================================================================
// Repositories
// =====================================================================

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    likes: Vec<Like>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

/// One store backing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_post_insert: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_post_inserts(&self) {
        *self.fail_post_insert.lock().unwrap() = true;
    }

    pub fn add_user(&self, external_id: &str, name: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    /// Insert a post whose `created_at` is `age_secs` in the past.
    pub fn add_post(&self, owner: &User, age_secs: i64) -> Post {
        let created_at = Utc::now() - Duration::seconds(age_secs);
        let post = Post {
            id: Uuid::new_v4(),
            user_id: owner.id,
            image_url: format!("{}/{}/{}.jpg", PUBLIC_BASE_URL, owner.external_id, age_secs),
            caption: None,
            created_at,
            updated_at: created_at,
        };
        self.tables.lock().unwrap().posts.push(post.clone());
        post
    }

    pub fn add_comment(&self, post: &Post, author: &User, content: &str) -> Comment {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: post.id,
            user_id: author.id,
            content: content.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.tables.lock().unwrap().comments.push(comment.clone());
        comment
    }

    pub fn like_count(&self) -> usize {
        self.tables.lock().unwrap().likes.len()
    }

    pub fn follow_count(&self) -> usize {
        self.tables.lock().unwrap().follows.len()
    }

    pub fn post_count(&self) -> usize {
        self.tables.lock().unwrap().posts.len()
    }

    pub fn has_comment(&self, comment_id: Uuid) -> bool {
        self.tables
            .lock()
            .unwrap()
            .comments
            .iter()
            .any(|c| c.id == comment_id)
    }

    fn decorate(tables: &Tables, post: &Post, viewer: Option<Uuid>) -> PostWithStats {
        let user = tables
            .users
            .iter()
            .find(|u| u.id == post.user_id)
            .cloned()
            .expect("post owner exists");
        PostWithStats {
            post: post.clone(),
            user,
            likes_count: tables.likes.iter().filter(|l| l.post_id == post.id).count() as i64,
            comments_count: tables
                .comments
                .iter()
                .filter(|c| c.post_id == post.id)
                .count() as i64,
            is_liked: viewer.is_some_and(|v| {
                tables
                    .likes
                    .iter()
                    .any(|l| l.post_id == post.id && l.user_id == v)
            }),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn upsert(&self, external_id: &str, name: &str) -> RepoResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(user) = tables.users.iter_mut().find(|u| u.external_id == external_id) {
            user.name = name.to_string();
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_with_stats(&self, external_id: &str) -> RepoResult<Option<UserWithStats>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .map(|user| UserWithStats {
                user: user.clone(),
                posts_count: tables.posts.iter().filter(|p| p.user_id == user.id).count() as i64,
                followers_count: tables
                    .follows
                    .iter()
                    .filter(|f| f.following_id == user.id)
                    .count() as i64,
                following_count: tables
                    .follows
                    .iter()
                    .filter(|f| f.follower_id == user.id)
                    .count() as i64,
            }))
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn list(
        &self,
        window: PageWindow,
        owner: Option<Uuid>,
        viewer: Option<Uuid>,
    ) -> RepoResult<Vec<PostWithStats>> {
        let tables = self.tables.lock().unwrap();
        let mut posts: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| owner.map_or(true, |o| p.user_id == o))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(posts
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .map(|p| Self::decorate(&tables, p, viewer))
            .collect())
    }

    async fn count(&self, owner: Option<Uuid>) -> RepoResult<i64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .posts
            .iter()
            .filter(|p| owner.map_or(true, |o| p.user_id == o))
            .count() as i64)
    }

    async fn find_with_stats(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> RepoResult<Option<PostWithStats>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| Self::decorate(&tables, p, viewer)))
    }

    async fn find(&self, post_id: Uuid) -> RepoResult<Option<Post>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn insert(&self, post: NewPost) -> RepoResult<Post> {
        if *self.fail_post_insert.lock().unwrap() {
            return Err(RepoError::Database(sqlx::Error::PoolTimedOut));
        }
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            image_url: post.image_url,
            caption: post.caption,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().posts.push(post.clone());
        Ok(post)
    }

    async fn delete(&self, post_id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != post_id);
        let removed = tables.posts.len() < before;
        if removed {
            tables.likes.retain(|l| l.post_id != post_id);
            tables.comments.retain(|c| c.post_id != post_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn insert(&self, post_id: Uuid, user_id: Uuid) -> RepoResult<Option<Like>> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.posts.iter().any(|p| p.id == post_id) {
            return Err(RepoError::MissingReference);
        }
        if tables
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id)
        {
            return Ok(None);
        }
        let like = Like {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            created_at: Utc::now(),
        };
        tables.likes.push(like.clone());
        Ok(Some(like))
    }

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(tables.likes.len() < before)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list(
        &self,
        post_id: Uuid,
        window: Option<PageWindow>,
    ) -> RepoResult<Vec<CommentWithUser>> {
        let tables = self.tables.lock().unwrap();
        let mut comments: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let (skip, take) = match window {
            Some(w) => (w.offset as usize, w.limit as usize),
            None => (0, usize::MAX),
        };
        Ok(comments
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|c| CommentWithUser {
                comment: c.clone(),
                user: tables
                    .users
                    .iter()
                    .find(|u| u.id == c.user_id)
                    .cloned()
                    .expect("comment author exists"),
            })
            .collect())
    }

    async fn insert(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> RepoResult<CommentWithUser> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.posts.iter().any(|p| p.id == post_id) {
            return Err(RepoError::MissingReference);
        }
        let user = tables
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(RepoError::MissingReference)?;
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(CommentWithUser { comment, user })
    }

    async fn find(&self, comment_id: Uuid) -> RepoResult<Option<Comment>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.comments.iter().find(|c| c.id == comment_id).cloned())
    }

    async fn delete(&self, comment_id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != comment_id);
        Ok(tables.comments.len() < before)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn insert(&self, follower_id: Uuid, following_id: Uuid) -> RepoResult<Option<Follow>> {
        if follower_id == following_id {
            return Err(RepoError::CheckViolation("follows_no_self".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        if tables
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id)
        {
            return Ok(None);
        }
        let follow = Follow {
            id: Uuid::new_v4(),
            follower_id,
            following_id,
            created_at: Utc::now(),
        };
        tables.follows.push(follow.clone());
        Ok(Some(follow))
    }

    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.following_id == following_id));
        Ok(tables.follows.len() < before)
    }

    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> RepoResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id))
    }
}

// =====================================================================
// Object storage
// =====================================================================

/// Records every upload and delete it receives.
#[derive(Default)]
pub struct RecordingStorage {
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    pub deletes: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _, _)| key.clone())
            .collect()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, S3Error> {
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string(), body.len()));
        Ok(format!("{}/{}", PUBLIC_BASE_URL, key))
    }

    async fn delete(&self, key: &str) -> Result<(), S3Error> {
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(PUBLIC_BASE_URL)?
            .strip_prefix('/')
            .map(str::to_string)
    }

    async fn health_check(&self) -> Result<(), S3Error> {
        Ok(())
    }
}

// =====================================================================
// App and request helpers
// =====================================================================

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub storage: Arc<RecordingStorage>,
    pub state: AppState,
}

impl TestEnv {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let storage = RecordingStorage::new();
        let state = AppState {
            users: store.clone(),
            posts: store.clone(),
            likes: store.clone(),
            comments: store.clone(),
            follows: store.clone(),
            storage: storage.clone(),
            upload: UploadConfig::default(),
        };
        Self {
            store,
            storage,
            state,
        }
    }
}

pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let verifier = Arc::new(
        TokenVerifier::from_hs256_secret(TEST_SECRET, None).expect("test secret is valid"),
    );
    App::new()
        .app_data(web::Data::new(state))
        .configure(move |cfg| handlers::configure_routes(cfg, verifier))
}

pub fn token_for(external_id: &str) -> String {
    let claims = Claims {
        sub: external_id.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
        iat: Some(Utc::now().timestamp()),
        iss: None,
        name: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .expect("token encodes")
}

pub fn bearer(external_id: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(external_id)))
}

pub const BOUNDARY: &str = "----sns-test-boundary";

/// Build a multipart body with an optional image part and caption.
pub fn multipart_body(
    image: Option<(&str, &str, Vec<u8>)>,
    caption: Option<&str>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(caption) = caption {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\n{caption}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
