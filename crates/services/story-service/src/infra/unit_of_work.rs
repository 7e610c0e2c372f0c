//! Unit of Work pattern implementation.
//!
//! A unit of work opens one database transaction and hands out the
//! repositories bound to it. Every story operation runs inside exactly one
//! transaction: committed on success, rolled back on any error.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};

use common::{AppError, AppResult};

use crate::repository::{ChallengeRepository, SeaStore, StoryRepository, UserRepository};

/// Starts transactions.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Begin a new transaction
    async fn begin(&self) -> AppResult<Box<dyn Transaction>>;
}

/// Repository access within one open transaction.
///
/// Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait Transaction: Send + Sync {
    fn challenges(&self) -> &dyn ChallengeRepository;

    fn users(&self) -> &dyn UserRepository;

    fn stories(&self) -> &dyn StoryRepository;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Commit `tx` if `result` is `Ok`, roll it back otherwise.
///
/// A failed rollback is logged; the original error is returned.
pub async fn complete<T>(tx: Box<dyn Transaction>, result: AppResult<T>) -> AppResult<T>
where
    T: Send,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    isolation: IsolationLevel,
}

impl Persistence {
    /// Create new UnitOfWork instance using ReadCommitted isolation
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            isolation: IsolationLevel::ReadCommitted,
        }
    }

    /// Use a different isolation level for every transaction
    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    async fn begin(&self) -> AppResult<Box<dyn Transaction>> {
        let txn = self
            .db
            .begin_with_config(Some(self.isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        Ok(Box::new(SeaTransaction {
            store: SeaStore::new(txn),
        }))
    }
}

/// Transaction-bound repositories backed by SeaORM.
pub struct SeaTransaction {
    store: SeaStore<DatabaseTransaction>,
}

#[async_trait]
impl Transaction for SeaTransaction {
    fn challenges(&self) -> &dyn ChallengeRepository {
        &self.store
    }

    fn users(&self) -> &dyn UserRepository {
        &self.store
    }

    fn stories(&self) -> &dyn StoryRepository {
        &self.store
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.store
            .into_inner()
            .commit()
            .await
            .map_err(AppError::from)
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.store
            .into_inner()
            .rollback()
            .await
            .map_err(AppError::from)
    }
}
