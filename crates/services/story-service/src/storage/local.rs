//! Local filesystem image store.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use common::{AppError, AppResult};
use domain::ImageUpload;

use super::{object_key, public_url, ImageStore};

/// Writes images below a root directory served under a public base URL.
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, image: ImageUpload, folder: &str) -> AppResult<String> {
        let key = object_key(folder, &image)?;
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(format!("create {}: {}", parent.display(), e)))?;
        }

        fs::write(&path, &image.bytes)
            .await
            .map_err(|e| AppError::storage(format!("write {}: {}", path.display(), e)))?;

        tracing::debug!(key = %key, bytes = image.len(), "Stored image on local disk");
        Ok(public_url(&self.public_base_url, &key))
    }
}
