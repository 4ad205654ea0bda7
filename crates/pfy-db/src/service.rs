//! Service layer over the database handle.
//!
//! All repository methods are implemented as `impl PfyService` blocks in
//! `repos/*.rs`. The service is cheap to share behind an `Arc` and is used
//! concurrently by request handlers and the background sweep.

use crate::PfyDb;
use crate::error::DatabaseError;

pub struct PfyService {
    db: PfyDb,
}

impl PfyService {
    /// Open (and migrate) a local database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        Ok(Self {
            db: PfyDb::open_local(db_path).await?,
        })
    }

    /// Create from an existing `PfyDb`.
    #[must_use]
    pub const fn from_db(db: PfyDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &PfyDb {
        &self.db
    }
}
