//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod challenge;
pub mod story;
pub mod user;
