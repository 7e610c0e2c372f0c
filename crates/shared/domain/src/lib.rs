//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The story service and its HTTP layer share these types.

pub mod challenge;
pub mod constants;
pub mod error;
pub mod image;
pub mod story;
pub mod user;

pub use challenge::Challenge;
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use image::ImageUpload;
pub use story::{NewStory, ReportOutcome, Story, StoryPolicy, StoryUrls};
pub use user::User;
