//! Challenge domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A campaign that groups stories. Read-only for the story service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
