//! Connection holder shared by the SeaORM repository implementations.

/// SeaORM-backed store.
///
/// `C` is either a `DatabaseConnection` or a `DatabaseTransaction`.
pub struct SeaStore<C> {
    db: C,
}

impl<C> SeaStore<C> {
    /// Create new store over a connection or transaction
    pub fn new(db: C) -> Self {
        Self { db }
    }

    /// Borrow the underlying connection
    pub fn connection(&self) -> &C {
        &self.db
    }

    /// Give the underlying connection back (used to commit a transaction)
    pub fn into_inner(self) -> C {
        self.db
    }
}
