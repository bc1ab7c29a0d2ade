/// Object storage configuration for uploaded media
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket holding uploaded images
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...)
    pub endpoint: Option<String>,
    /// Base URL under which objects are publicly readable
    pub public_base_url: String,
    /// Whether to use path-style addressing (false = virtual-hosted-style)
    pub path_style: bool,
}

impl S3Config {
    /// Public URL for an object key.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    /// Reverse of [`public_url`](Self::public_url): the object key behind a
    /// URL, or `None` when the URL does not point into this bucket.
    pub fn key_from_public_url(&self, url: &str) -> Option<String> {
        let base = self.public_base_url.trim_end_matches('/');
        let key = url.strip_prefix(base)?.strip_prefix('/')?;
        let key = key.split(['?', '#']).next().unwrap_or_default();
        (!key.is_empty()).then(|| key.to_string())
    }
}
