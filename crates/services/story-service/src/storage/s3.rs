//! S3-compatible image store.

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use common::{AppError, AppResult};
use domain::ImageUpload;

use super::{object_key, public_url, ImageStore};
use crate::config::S3Config;

/// Puts images into an S3 bucket.
pub struct S3ImageStore {
    client: Client,
    bucket: String,
    base_url: String,
}

impl S3ImageStore {
    /// Build an S3 client from the provided configuration.
    pub async fn connect(config: &S3Config) -> AppResult<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AppError::internal("S3_BUCKET must be set for the s3 storage backend"));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "story-service",
        );

        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = &config.endpoint {
            // MinIO and most self-hosted stores need path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            base_url: base_url(config),
        })
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(&self, image: ImageUpload, folder: &str) -> AppResult<String> {
        let key = object_key(folder, &image)?;
        let size = image.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(image.content_type)
            .body(ByteStream::from(image.bytes))
            .send()
            .await
            .map_err(|e| AppError::storage(format!("put_object {}: {}", key, e)))?;

        tracing::debug!(key = %key, bytes = size, bucket = %self.bucket, "Stored image in S3");
        Ok(public_url(&self.base_url, &key))
    }
}

/// URL prefix for objects in the configured bucket.
fn base_url(config: &S3Config) -> String {
    if let Some(url) = &config.public_base_url {
        return url.clone();
    }
    match &config.endpoint {
        Some(endpoint) => public_url(endpoint, &config.bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region),
    }
}
