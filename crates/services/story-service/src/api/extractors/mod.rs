//! Custom request extractors.

mod rejection;

pub use rejection::{ApiJson, ApiQuery};
