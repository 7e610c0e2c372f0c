//! Application state for dependency injection.

use std::sync::Arc;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::infra::HealthProbe;
use crate::service::StoryService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub story_service: Arc<dyn StoryService>,
    pub health: Arc<dyn HealthProbe>,
    /// Largest accepted multipart body for story creation
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new app state.
    pub fn new(story_service: Arc<dyn StoryService>, health: Arc<dyn HealthProbe>) -> Self {
        Self {
            story_service,
            health,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload body limit.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
