//! Repository layer for data access.
//!
//! Every repository trait is implemented by [`SeaStore`], which is generic
//! over the SeaORM connection so the same queries run against a pooled
//! connection or inside a transaction.

mod challenge_repository;
pub mod entities;
mod store;
mod story_repository;
mod user_repository;

pub use challenge_repository::ChallengeRepository;
pub use store::SeaStore;
pub use story_repository::StoryRepository;
pub use user_repository::UserRepository;

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use challenge_repository::MockChallengeRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use story_repository::MockStoryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
