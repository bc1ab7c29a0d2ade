/// S3 operations used by media ingestion: upload, delete, bucket probe
use crate::config::S3Config;
use crate::S3Error;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Upload an object and return its public URL.
    pub async fn upload_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<String, S3Error> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .cache_control(cache_control)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(bucket = %self.config.bucket, %key, "object uploaded");
        Ok(self.config.public_url(key))
    }

    /// Delete an object. Deleting a missing key succeeds on S3.
    pub async fn delete_object(&self, key: &str) -> Result<(), S3Error> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| S3Error::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(bucket = %self.config.bucket, %key, "object deleted");
        Ok(())
    }

    /// Bucket reachability probe for readiness checks.
    pub async fn head_bucket(&self) -> Result<(), S3Error> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Unavailable(e.to_string()))?;
        Ok(())
    }
}
