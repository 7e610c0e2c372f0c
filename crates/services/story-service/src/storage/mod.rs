//! Image storage.
//!
//! Uploaded images are written to an object store and addressed by a public
//! URL. Two backends exist: the local filesystem and S3-compatible storage.

mod local;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::ImageUpload;

use crate::config::StorageConfig;

pub use local::LocalImageStore;
pub use s3::S3ImageStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Binary image storage returning publicly resolvable URLs.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `image` under `folder` and return its URL
    async fn upload(&self, image: ImageUpload, folder: &str) -> AppResult<String>;
}

/// Build the image store selected by configuration.
pub async fn build_image_store(config: &StorageConfig) -> AppResult<Arc<dyn ImageStore>> {
    match config {
        StorageConfig::Local {
            root,
            public_base_url,
        } => {
            tracing::info!("Using local image storage at {}", root);
            Ok(Arc::new(LocalImageStore::new(root, public_base_url)))
        }
        StorageConfig::S3(s3) => {
            tracing::info!("Using S3 image storage (bucket {})", s3.bucket);
            Ok(Arc::new(S3ImageStore::connect(s3).await?))
        }
    }
}

/// Object key `<folder>/<uuid>[.<ext>]` for a new upload.
pub(crate) fn object_key(folder: &str, image: &ImageUpload) -> AppResult<String> {
    let folder = folder.trim_matches('/');
    if folder.is_empty() || folder.split('/').any(|part| part.is_empty() || part == "..") {
        return Err(AppError::internal(format!("Invalid storage folder '{}'", folder)));
    }

    let name = Uuid::new_v4();
    Ok(match image.extension() {
        Some(ext) => format!("{}/{}.{}", folder, name, ext),
        None => format!("{}/{}", folder, name),
    })
}

/// Join a base URL and an object key with exactly one slash.
pub(crate) fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
