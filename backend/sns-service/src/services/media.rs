//! Media ingestion and post deletion.
//!
//! Uploads are validated in a fixed order before storage is touched: image
//! present, size, MIME type, caption. The object is stored under
//! `{external_id}/{unix_millis}-{suffix}.{ext}` and the post row is written
//! afterwards. If that write fails the object is removed again on a
//! best-effort basis.

use super::IdentityService;
use crate::config::UploadConfig;
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::metrics::record_upload;
use crate::models::{NewPost, Post};
use crate::storage::ObjectStorage;
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_CAPTION_CHARS: usize = 2200;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

const DEFAULT_EXTENSION: &str = "jpg";
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

/// Image part as read from the multipart body.
#[derive(Debug, Clone, Default)]
pub struct ImagePart {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    /// Reading stopped because the part exceeded the size limit
    pub truncated: bool,
}

/// Raw `POST /posts` form.
#[derive(Debug, Clone, Default)]
pub struct PostUpload {
    pub image: Option<ImagePart>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: String,
    pub caption: Option<String>,
}

#[derive(Clone)]
pub struct MediaService {
    identity: IdentityService,
    posts: Arc<dyn PostRepository>,
    storage: Arc<dyn ObjectStorage>,
    limits: UploadConfig,
}

impl MediaService {
    pub fn new(
        identity: IdentityService,
        posts: Arc<dyn PostRepository>,
        storage: Arc<dyn ObjectStorage>,
        limits: UploadConfig,
    ) -> Self {
        Self {
            identity,
            posts,
            storage,
            limits,
        }
    }

    pub async fn create_post(&self, caller: &str, upload: PostUpload) -> Result<Post> {
        let upload = match validate_upload(upload, self.limits) {
            Ok(upload) => upload,
            Err(e) => {
                record_upload("rejected");
                return Err(e);
            }
        };
        let owner = self.identity.resolve(caller).await?;

        let key = object_key(
            caller,
            chrono::Utc::now().timestamp_millis(),
            &random_suffix(),
            &upload.extension,
        );
        let size = upload.bytes.len();

        let image_url = self
            .storage
            .upload(&key, upload.bytes, &upload.content_type)
            .await
            .map_err(|e| {
                record_upload("failed");
                AppError::internal(MessageKey::UploadFailed, e)
            })?;

        let new_post = NewPost {
            user_id: owner.id,
            image_url,
            caption: upload.caption,
        };

        match self.posts.insert(new_post).await {
            Ok(post) => {
                record_upload("stored");
                tracing::info!(post_id = %post.id, user_id = %owner.id, %key, size, "post created");
                Ok(post)
            }
            Err(insert_err) => {
                if let Err(cleanup_err) = self.storage.delete(&key).await {
                    tracing::warn!(%key, error = %cleanup_err, "failed to clean up orphaned upload");
                } else {
                    record_upload("cleaned_up");
                }
                Err(AppError::internal(MessageKey::CreatePostFailed, insert_err))
            }
        }
    }

    /// Owner-only delete. Likes and comments cascade in the database; the
    /// image object is removed afterwards on a best-effort basis.
    pub async fn delete_post(&self, caller: &str, post_id: Uuid) -> Result<()> {
        let user = self.identity.resolve(caller).await?;

        let post = self
            .posts
            .find(post_id)
            .await
            .map_err(|e| AppError::internal(MessageKey::DeletePostFailed, e))?
            .ok_or(AppError::NotFound(MessageKey::PostNotFound))?;

        if post.user_id != user.id {
            tracing::warn!(%post_id, caller_id = %user.id, "post delete denied");
            return Err(AppError::Forbidden(MessageKey::PostDeleteForbidden));
        }

        let deleted = self
            .posts
            .delete(post_id)
            .await
            .map_err(|e| AppError::internal(MessageKey::DeletePostFailed, e))?;
        if !deleted {
            return Err(AppError::NotFound(MessageKey::PostNotFound));
        }

        match self.storage.key_for_url(&post.image_url) {
            Some(key) => {
                if let Err(e) = self.storage.delete(&key).await {
                    tracing::warn!(%post_id, %key, error = %e, "failed to delete post image");
                }
            }
            None => {
                tracing::debug!(%post_id, url = %post.image_url, "post image is not in this bucket");
            }
        }

        tracing::info!(%post_id, user_id = %user.id, "post deleted");
        Ok(())
    }
}

/// Check an upload in order: image present, size, MIME type, caption.
pub fn validate_upload(upload: PostUpload, limits: UploadConfig) -> Result<ValidatedUpload> {
    let image = upload
        .image
        .filter(|image| image.truncated || !image.bytes.is_empty())
        .ok_or(AppError::BadRequest(MessageKey::ImageRequired))?;

    if image.truncated || image.bytes.len() > limits.max_bytes {
        return Err(AppError::BadRequest(MessageKey::ImageTooLarge));
    }

    let content_type = image
        .content_type
        .as_deref()
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| ALLOWED_IMAGE_TYPES.contains(&ct.as_str()))
        .ok_or(AppError::BadRequest(MessageKey::UnsupportedImageType))?;

    // The limit applies to the caption as submitted; trimming is for storage.
    if upload
        .caption
        .as_ref()
        .is_some_and(|c| c.chars().count() > MAX_CAPTION_CHARS)
    {
        return Err(AppError::BadRequest(MessageKey::CaptionTooLong));
    }
    let caption = upload
        .caption
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    Ok(ValidatedUpload {
        extension: file_extension(image.file_name.as_deref()),
        bytes: image.bytes,
        content_type,
        caption,
    })
}

/// Lowercased extension of the uploaded file name, `jpg` when absent.
pub fn file_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

pub fn object_key(external_id: &str, unix_millis: i64, suffix: &str, extension: &str) -> String {
    format!("{}/{}-{}.{}", external_id, unix_millis, suffix, extension)
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}
