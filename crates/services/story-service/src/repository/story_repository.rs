//! Story persistence.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Select, Set,
};

use super::entities::story::{self, ActiveModel, Entity as StoryEntity};
use super::store::SeaStore;
use common::{AppError, AppResult};
use domain::{NewStory, Story};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Story repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Insert a story with a zero report count
    async fn create(&self, story: NewStory) -> AppResult<Story>;

    /// Find story by ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Story>>;

    /// All stories of a user within a challenge, oldest first
    async fn find_by_user_and_challenge(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> AppResult<Vec<Story>>;

    /// Persist the story's current report count
    async fn update_report_count(&self, story: Story) -> AppResult<Story>;

    /// Permanently delete a story
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[async_trait]
impl<C> StoryRepository for SeaStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn create(&self, new_story: NewStory) -> AppResult<Story> {
        let active_model = ActiveModel {
            id: NotSet,
            user_id: Set(new_story.user_id),
            challenge_id: Set(new_story.challenge_id),
            image_url: Set(new_story.image_url),
            report_count: Set(0),
            created_at: Set(Utc::now()),
        };

        let model = active_model
            .insert(self.connection())
            .await
            .map_err(AppError::from)?;

        Ok(Story::from(model))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Story>> {
        let result = StoryEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Story::from))
    }

    async fn find_by_user_and_challenge(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> AppResult<Vec<Story>> {
        let models = stories_of(user_id, challenge_id)
            .all(self.connection())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Story::from).collect())
    }

    async fn update_report_count(&self, story: Story) -> AppResult<Story> {
        let active = ActiveModel {
            id: Set(story.id),
            report_count: Set(story.report_count),
            ..Default::default()
        };

        match active.update(self.connection()).await {
            Ok(model) => Ok(Story::from(model)),
            Err(DbErr::RecordNotUpdated) => Err(AppError::StoryNotFound),
            Err(e) => Err(AppError::from(e)),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = StoryEntity::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::StoryNotFound);
        }

        Ok(())
    }
}

/// Stories of one user within one challenge, in creation order.
fn stories_of(user_id: i64, challenge_id: i64) -> Select<StoryEntity> {
    StoryEntity::find()
        .filter(story::Column::UserId.eq(user_id))
        .filter(story::Column::ChallengeId.eq(challenge_id))
        .order_by_asc(story::Column::Id)
}
