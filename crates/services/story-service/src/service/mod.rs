//! Service layer - story use cases.

mod events;
mod story_service;

pub use events::{NoopStoryEvents, StoryEvents, TracingStoryEvents};
pub use story_service::{StoryManager, StoryService};

#[cfg(any(test, feature = "test-utils"))]
pub use story_service::MockStoryService;
