//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Reporting
// =============================================================================

/// Number of reports at which a story is removed
pub const DEFAULT_REPORT_THRESHOLD: i32 = 3;

// =============================================================================
// Image storage
// =============================================================================

/// Storage folder for images posted as stories
pub const POST_IMAGE_FOLDER: &str = "post";

/// Longest file extension kept when deriving an object key
pub const MAX_IMAGE_EXTENSION_LENGTH: usize = 8;

/// Content type used when the client does not send one
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "application/octet-stream";
