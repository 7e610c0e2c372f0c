//! HTTP request handlers.

pub mod health_handler;
pub mod story_handler;

pub use health_handler::health_routes;
pub use story_handler::story_routes;
