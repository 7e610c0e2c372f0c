//! User lookup.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, EntityTrait};

use super::entities::user::Entity as UserEntity;
use super::store::SeaStore;
use common::{AppError, AppResult};
use domain::User;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to users.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
}

#[async_trait]
impl<C> UserRepository for SeaStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }
}
