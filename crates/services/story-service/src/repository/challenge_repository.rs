//! Challenge lookup.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, EntityTrait};

use super::entities::challenge::Entity as ChallengeEntity;
use super::store::SeaStore;
use common::{AppError, AppResult};
use domain::Challenge;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to challenges.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Find challenge by ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Challenge>>;
}

#[async_trait]
impl<C> ChallengeRepository for SeaStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Challenge>> {
        let result = ChallengeEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Challenge::from))
    }
}
