/// Object storage seam for uploaded images
use async_trait::async_trait;
use s3_utils::{S3Error, S3Operations};

/// Uploaded images are immutable under their generated key.
pub const IMAGE_CACHE_CONTROL: &str = "max-age=3600";

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `body` under `key` and return its public URL.
    async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str)
        -> Result<String, S3Error>;

    async fn delete(&self, key: &str) -> Result<(), S3Error>;

    /// Object key behind a public URL, if it points into this store.
    fn key_for_url(&self, url: &str) -> Option<String>;

    async fn health_check(&self) -> Result<(), S3Error>;
}

#[async_trait]
impl ObjectStorage for S3Operations {
    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, S3Error> {
        self.upload_object(key, body, content_type, IMAGE_CACHE_CONTROL)
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), S3Error> {
        self.delete_object(key).await
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        self.config().key_from_public_url(url)
    }

    async fn health_check(&self) -> Result<(), S3Error> {
        self.head_bucket().await
    }
}
