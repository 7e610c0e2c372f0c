//! Story service - posting, reporting and listing stories.
//!
//! Every operation runs in one transaction obtained from the unit of work.
//! Image uploads happen outside of it and are not undone on failure.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult};
use domain::{ImageUpload, NewStory, ReportOutcome, StoryPolicy, StoryUrls, POST_IMAGE_FOLDER};

use super::events::StoryEvents;
use crate::infra::{complete, Transaction, UnitOfWork};
use crate::storage::ImageStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Story service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StoryService: Send + Sync {
    /// Upload images and create one story per image.
    ///
    /// Returns the image URLs in input order.
    async fn create_post(
        &self,
        challenge_id: i64,
        author_id: i64,
        images: Vec<ImageUpload>,
    ) -> AppResult<Vec<String>>;

    /// Record one report against a story, deleting it at the threshold
    async fn report_story(&self, story_id: i64) -> AppResult<ReportOutcome>;

    /// Nickname and story URLs of a user within a challenge
    async fn get_story(&self, user_id: i64, challenge_id: i64) -> AppResult<StoryUrls>;
}

/// Concrete implementation of StoryService.
pub struct StoryManager {
    uow: Arc<dyn UnitOfWork>,
    images: Arc<dyn ImageStore>,
    events: Arc<dyn StoryEvents>,
    policy: StoryPolicy,
}

impl StoryManager {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        images: Arc<dyn ImageStore>,
        events: Arc<dyn StoryEvents>,
        policy: StoryPolicy,
    ) -> Self {
        Self {
            uow,
            images,
            events,
            policy,
        }
    }

    async fn store_images(
        &self,
        tx: &dyn Transaction,
        challenge_id: i64,
        author_id: i64,
        images: Vec<ImageUpload>,
        uploaded: &mut Vec<String>,
    ) -> AppResult<Vec<String>> {
        let challenge = tx
            .challenges()
            .find_by_id(challenge_id)
            .await?
            .ok_or(AppError::ChallengeNotFound)?;

        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            let url = self.images.upload(image, POST_IMAGE_FOLDER).await?;
            uploaded.push(url.clone());
            self.events.image_uploaded(challenge.id, &url);

            let story = tx
                .stories()
                .create(NewStory {
                    user_id: author_id,
                    challenge_id: challenge.id,
                    image_url: url,
                })
                .await?;
            urls.push(story.image_url);
        }

        Ok(urls)
    }

    async fn apply_report(
        &self,
        tx: &dyn Transaction,
        story_id: i64,
    ) -> AppResult<(ReportOutcome, i32)> {
        let mut story = tx
            .stories()
            .find_by_id(story_id)
            .await?
            .ok_or(AppError::StoryNotFound)?;

        let outcome = story.register_report(&self.policy);
        let story = tx.stories().update_report_count(story).await?;

        if outcome.is_removed() {
            tx.stories().delete(story.id).await?;
        }

        Ok((outcome, story.report_count))
    }

    async fn load_story_urls(
        &self,
        tx: &dyn Transaction,
        user_id: i64,
        challenge_id: i64,
    ) -> AppResult<StoryUrls> {
        // An unknown user is reported as a missing story
        let user = tx
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::StoryNotFound)?;

        let stories = tx
            .stories()
            .find_by_user_and_challenge(user_id, challenge_id)
            .await?;

        Ok(StoryUrls {
            nickname: user.nickname,
            image_urls: stories.into_iter().map(|s| s.image_url).collect(),
        })
    }
}

#[async_trait]
impl StoryService for StoryManager {
    async fn create_post(
        &self,
        challenge_id: i64,
        author_id: i64,
        images: Vec<ImageUpload>,
    ) -> AppResult<Vec<String>> {
        if images.is_empty() {
            return Err(AppError::validation("At least one image is required"));
        }

        let tx = self.uow.begin().await?;
        let mut uploaded = Vec::with_capacity(images.len());
        let result = self
            .store_images(&*tx, challenge_id, author_id, images, &mut uploaded)
            .await;
        let result = complete(tx, result).await;

        if result.is_err() && !uploaded.is_empty() {
            self.events.uploads_orphaned(challenge_id, &uploaded);
        }

        result
    }

    async fn report_story(&self, story_id: i64) -> AppResult<ReportOutcome> {
        let tx = self.uow.begin().await?;
        let result = self.apply_report(&*tx, story_id).await;
        let (outcome, report_count) = complete(tx, result).await?;

        match outcome {
            ReportOutcome::Removed => self.events.story_removed(story_id, report_count),
            ReportOutcome::Active { .. } => self.events.story_reported(story_id, report_count),
        }

        Ok(outcome)
    }

    async fn get_story(&self, user_id: i64, challenge_id: i64) -> AppResult<StoryUrls> {
        let tx = self.uow.begin().await?;
        let result = self.load_story_urls(&*tx, user_id, challenge_id).await;
        complete(tx, result).await
    }
}
