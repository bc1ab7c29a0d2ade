/// S3 utilities for media storage
///
/// Builds the AWS S3 client (with optional custom endpoint for S3-compatible
/// stores) and wraps the handful of object operations the SNS service needs.
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;
use std::sync::Arc;

pub mod config;
pub mod operations;

pub use config::S3Config;
pub use operations::S3Operations;

#[derive(Debug, thiserror::Error)]
pub enum S3Error {
    #[error("failed to upload object {key}: {message}")]
    Upload { key: String, message: String },

    #[error("failed to delete object {key}: {message}")]
    Delete { key: String, message: String },

    #[error("object storage unavailable: {0}")]
    Unavailable(String),
}

/// Build an S3 client from the ambient AWS environment plus `config`.
pub async fn connect(config: S3Config) -> S3Operations {
    let aws_config = aws_config::load_from_env().await;

    let mut builder =
        aws_sdk_s3::config::Builder::from(&aws_config).region(Region::new(config.region.clone()));
    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint);
    }
    builder = builder.force_path_style(config.path_style);

    let client = Client::from_conf(builder.build());
    tracing::info!(
        bucket = %config.bucket,
        region = %config.region,
        custom_endpoint = config.endpoint.is_some(),
        "S3 client initialized"
    );

    S3Operations::new(Arc::new(client), config)
}
