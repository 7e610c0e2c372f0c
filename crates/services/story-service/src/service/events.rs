//! Diagnostic hooks emitted by the story service.

/// Receiver for story lifecycle events.
///
/// All methods default to doing nothing so implementations only override
/// what they care about.
pub trait StoryEvents: Send + Sync {
    /// An image was written to the image store
    fn image_uploaded(&self, _challenge_id: i64, _url: &str) {}

    /// A report was recorded and the story is still visible
    fn story_reported(&self, _story_id: i64, _report_count: i32) {}

    /// A story reached the report threshold and was deleted
    fn story_removed(&self, _story_id: i64, _report_count: i32) {}

    /// Images were stored but the request failed, so nothing references them
    fn uploads_orphaned(&self, _challenge_id: i64, _urls: &[String]) {}
}

/// Emits every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStoryEvents;

impl StoryEvents for TracingStoryEvents {
    fn image_uploaded(&self, challenge_id: i64, url: &str) {
        tracing::info!(challenge_id, url, "Story image uploaded");
    }

    fn story_reported(&self, story_id: i64, report_count: i32) {
        tracing::info!(story_id, report_count, "Story reported");
    }

    fn story_removed(&self, story_id: i64, report_count: i32) {
        tracing::warn!(story_id, report_count, "Story removed after too many reports");
    }

    fn uploads_orphaned(&self, challenge_id: i64, urls: &[String]) {
        tracing::error!(
            challenge_id,
            count = urls.len(),
            urls = ?urls,
            "Uploaded images are orphaned after a failed story creation"
        );
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStoryEvents;

impl StoryEvents for NoopStoryEvents {}
