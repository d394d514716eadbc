//! # Database State
//!
//! Wraps the store handle for use in commands.
//!
//! ## Thread Safety
//! The `Database` from `till-db` holds a `SqlitePool`, which is thread-safe.
//! Commands run queries concurrently without explicit locking; SQLite's
//! writer lock serializes conflicting sale commits.

use till_db::Database;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let hits = db_state.inner().products().search("kettle", None, 20).await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
