//! User domain entity.

use serde::{Deserialize, Serialize};

/// Story author. Only the nickname is read by the story service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub nickname: String,
}
