//! Story domain entity and the report-based removal rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REPORT_THRESHOLD;
use crate::error::{DomainError, DomainResult};

/// One posted image within a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: i64,
    /// Authoring user (lookup only)
    pub user_id: i64,
    pub challenge_id: i64,
    pub image_url: String,
    /// Number of reports received so far, never negative
    pub report_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Register one report and decide whether the story survives it.
    ///
    /// The counter is incremented even when the story ends up removed.
    pub fn register_report(&mut self, policy: &StoryPolicy) -> ReportOutcome {
        self.report_count = self.report_count.saturating_add(1);
        if policy.should_remove(self.report_count) {
            ReportOutcome::Removed
        } else {
            ReportOutcome::Active {
                report_count: self.report_count,
            }
        }
    }
}

/// Data required to insert a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub user_id: i64,
    pub challenge_id: i64,
    pub image_url: String,
}

/// Result of reporting a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ReportOutcome {
    /// Story is still visible
    Active { report_count: i32 },
    /// Story reached the threshold and was deleted
    Removed,
}

impl ReportOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, ReportOutcome::Removed)
    }
}

/// Moderation rules applied to stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryPolicy {
    report_threshold: i32,
}

impl StoryPolicy {
    /// Create a policy; the threshold must be at least 1.
    pub fn new(report_threshold: i32) -> DomainResult<Self> {
        if report_threshold < 1 {
            return Err(DomainError::validation(
                "Report threshold must be at least 1",
            ));
        }
        Ok(Self { report_threshold })
    }

    pub fn report_threshold(&self) -> i32 {
        self.report_threshold
    }

    pub fn should_remove(&self, report_count: i32) -> bool {
        report_count >= self.report_threshold
    }
}

impl Default for StoryPolicy {
    fn default() -> Self {
        Self {
            report_threshold: DEFAULT_REPORT_THRESHOLD,
        }
    }
}

/// A user's stories within one challenge, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StoryUrls {
    /// Display name of the author
    pub nickname: String,
    /// Image URLs in creation order
    pub image_urls: Vec<String>,
}
